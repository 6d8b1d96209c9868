// Error handling for the media service

use thiserror::Error;

/// Media service error types
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    /// The backend could not be created for a locator
    #[error("Load error: {0}")]
    Load(String),

    /// A backend call failed after the session was loaded
    #[error("Backend error: {0}")]
    Backend(String),

    /// Command action was missing or not recognised
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command is missing a required extra
    #[error("Missing extra: {0}")]
    MissingExtra(&'static str),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// No service registered under a native handle
    #[error("Invalid handle: {0}")]
    InvalidHandle(i64),

    /// JNI error (Android-specific)
    #[error("JNI error: {0}")]
    Jni(String),
}

/// Result type alias for media operations
pub type Result<T> = std::result::Result<T, MediaError>;
