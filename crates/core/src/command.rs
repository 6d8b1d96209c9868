// Commands accepted from the dispatch surface

/// A control command for the playback controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    /// Load and start a locator
    Play(String),
    Pause,
    Resume,
    Stop,
    /// External FORWARD command. See `ControllerConfig::swap_skip_commands`.
    Forward,
    /// External REWIND command. See `ControllerConfig::swap_skip_commands`.
    Rewind,
}

impl MediaCommand {
    pub fn name(&self) -> &'static str {
        match self {
            MediaCommand::Play(_) => "PLAY",
            MediaCommand::Pause => "PAUSE",
            MediaCommand::Resume => "RESUME",
            MediaCommand::Stop => "STOP",
            MediaCommand::Forward => "FORWARD",
            MediaCommand::Rewind => "REWIND",
        }
    }
}
