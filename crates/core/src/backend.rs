// Player backend abstraction
// The backend owns decoding and output; the controller only drives it.

use crate::error::Result;

/// Identifies one loaded session. Backend callbacks carry it so that late
/// callbacks from a replaced session can be recognised.
pub type SessionId = u64;

/// A loaded platform player bound to one media locator.
///
/// Callbacks (prepared, completion, error) are not registered on the backend.
/// The host delivers them to the controller as [`BackendEvent`] values on the
/// control thread.
pub trait PlayerBackend: Send {
    /// Start or resume playback
    fn start(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Stop playback. The handle stays allocated until released.
    fn stop(&mut self) -> Result<()>;

    /// Seek to a position in milliseconds. Values are passed through unchecked.
    fn seek_to(&mut self, position_ms: i64) -> Result<()>;

    fn is_playing(&self) -> bool;

    /// Total duration in milliseconds, negative when unknown
    fn duration(&self) -> i64;

    /// Current position in milliseconds
    fn current_position(&self) -> i64;

    /// Whether the media is ready to start. Backends that prepare
    /// asynchronously return false and later report [`BackendEvent::Prepared`].
    fn is_prepared(&self) -> bool {
        true
    }

    /// Free the native resources. Called exactly once per handle.
    fn release(&mut self) -> Result<()>;
}

/// Creates backends for locators
pub trait BackendFactory: Send {
    /// Load `locator`. Callbacks for the new backend must be reported with
    /// `session_id`.
    fn create(&mut self, session_id: SessionId, locator: &str) -> Result<Box<dyn PlayerBackend>>;
}

/// Asynchronous notifications from a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    /// Media finished preparing
    Prepared,

    /// Playback reached the end of the media
    Completed,

    /// Runtime failure reported by the platform player
    Error { what: i32, extra: i32 },
}
