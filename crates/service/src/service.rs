// Media service: lifecycle hooks around one playback controller

use crate::config::ServiceConfig;
use crate::intent::{Intent, StartMode};
use smodr_core::{
    BackendEvent, BackendFactory, PlaybackController, PlaybackObserver, Result, SessionId,
};
use std::sync::Arc;

/// Host-facing service. Commands arrive as intents, backend callbacks as
/// `on_*` hooks, and bound clients use the controller directly.
pub struct MediaService {
    controller: PlaybackController,
    config: ServiceConfig,
}

impl MediaService {
    pub fn new(factory: Box<dyn BackendFactory>, config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        log::info!("MediaService::new");

        Ok(Self {
            controller: PlaybackController::new(factory, config.controller.clone()),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn set_playback_listener(&mut self, listener: Option<Arc<dyn PlaybackObserver>>) {
        self.controller.set_observer(listener);
    }

    /// Dispatch one intent. Malformed or unknown intents are ignored.
    pub fn on_start_command(&mut self, intent: &Intent) -> StartMode {
        match intent.to_command() {
            Ok(command) => self.controller.execute(command),
            Err(e) => log::debug!("Ignoring intent {:?}: {}", intent.action, e),
        }
        StartMode::RedeliverIntent
    }

    pub fn on_prepared(&mut self, session: SessionId) {
        self.controller
            .handle_backend_event(session, BackendEvent::Prepared);
    }

    pub fn on_completion(&mut self, session: SessionId) {
        self.controller
            .handle_backend_event(session, BackendEvent::Completed);
    }

    /// Runtime backend failure. Always handled.
    pub fn on_error(&mut self, session: SessionId, what: i32, extra: i32) -> bool {
        self.controller
            .handle_backend_event(session, BackendEvent::Error { what, extra })
    }

    pub fn on_destroy(&mut self) {
        log::info!("MediaService::on_destroy");
        self.controller.shutdown();
    }
}
