// Playback state tracking

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No media loaded
    #[default]
    NoSession,
    /// Backend created, waiting for it to report prepared
    Loading,
    /// Media is playing
    Playing,
    /// Media is paused
    Paused,
    /// Playback stopped; the backend handle is still allocated
    Stopped,
}

impl PlaybackState {
    /// Integer code used across the native bridge
    pub fn code(self) -> i32 {
        match self {
            PlaybackState::NoSession => 0,
            PlaybackState::Loading => 1,
            PlaybackState::Playing => 2,
            PlaybackState::Paused => 3,
            PlaybackState::Stopped => 4,
        }
    }

    pub fn can_transition_to(self, to: PlaybackState) -> bool {
        use PlaybackState::*;

        match (self, to) {
            // play always tears down and reloads
            (_, Loading) => true,

            (Loading, Playing) => true,

            // pausing a pending session keeps it idle once prepared
            (Loading | Playing, Paused) => true,
            (Paused, Playing) => true,
            (Stopped, Playing) => true,

            // stop is valid from any state that holds a session
            (Loading | Playing | Paused | Stopped, Stopped) => true,

            // teardown
            (_, NoSession) => true,

            _ => false,
        }
    }
}

/// Snapshot of the controller for polling UIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    /// Id of the active session, if any
    pub session_id: Option<u64>,
    /// Locator of the active session, if any
    pub locator: Option<String>,
    /// Current position in milliseconds, -1 without a session
    pub position_ms: i64,
    /// Total duration in milliseconds, -1 without a session
    pub duration_ms: i64,
    pub playing: bool,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            state: PlaybackState::NoSession,
            session_id: None,
            locator: None,
            position_ms: -1,
            duration_ms: -1,
            playing: false,
        }
    }
}
