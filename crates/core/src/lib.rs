// Core types and traits for the Smodr media service

pub mod backend;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod observer;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
pub use backend::{BackendEvent, BackendFactory, PlayerBackend, SessionId};
pub use command::MediaCommand;
pub use config::ControllerConfig;
pub use controller::PlaybackController;
pub use error::{MediaError, Result};
pub use observer::{PlaybackEvent, PlaybackObserver};
pub use state::{PlaybackState, PlaybackStatus};
