// Playback lifecycle notifications

use std::sync::Arc;

/// Lifecycle events delivered to the registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback started or resumed
    Started,

    /// Playback paused or stopped
    Stopped,

    /// The backend reached the end of the media
    Completed,
}

/// Observer trait
/// Implementations should return quickly; events are fire-and-forget.
pub trait PlaybackObserver: Send + Sync {
    fn on_start_playback(&self);

    fn on_stop_playback(&self);

    fn on_completion(&self);

    /// Route an event to the matching callback
    fn on_event(&self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Started => self.on_start_playback(),
            PlaybackEvent::Stopped => self.on_stop_playback(),
            PlaybackEvent::Completed => self.on_completion(),
        }
    }
}

/// Single-slot observer registration. The last registration wins.
#[derive(Default)]
pub struct ObserverSlot {
    observer: Option<Arc<dyn PlaybackObserver>>,
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self { observer: None }
    }

    pub fn set(&mut self, observer: Option<Arc<dyn PlaybackObserver>>) {
        self.observer = observer;
    }

    pub fn clear(&mut self) {
        self.observer = None;
    }

    pub fn is_registered(&self) -> bool {
        self.observer.is_some()
    }

    pub fn notify(&self, event: PlaybackEvent) {
        match &self.observer {
            Some(observer) => observer.on_event(event),
            None => log::debug!("No observer registered, dropping {:?}", event),
        }
    }
}
