// Media service shell around the playback controller
// Hosts the controller behind intents, native handles, and JNI entry points

pub mod config;
pub mod event_queue;
pub mod intent;
pub mod logging;
pub mod registry;
pub mod service;

#[cfg(feature = "android")]
mod jni_bridge;

// Re-exports
pub use config::{LogConfig, ServiceConfig};
pub use event_queue::EventQueue;
pub use intent::{Episode, Intent, StartMode};
pub use logging::init_logging;
pub use service::MediaService;
pub use smodr_core::{
    BackendEvent, BackendFactory, ControllerConfig, MediaCommand, MediaError, PlaybackController,
    PlaybackEvent, PlaybackObserver, PlaybackState, PlayerBackend, Result, SessionId,
};
