// Deferred observer delivery
// Events are queued while the service is locked and delivered afterwards,
// so a listener may call back into the service from its callbacks.

use parking_lot::Mutex;
use smodr_core::{PlaybackEvent, PlaybackObserver};
use std::collections::VecDeque;

/// Observer that buffers events until the host drains them
#[derive(Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<PlaybackEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Take every queued event, oldest first
    pub fn drain(&self) -> Vec<PlaybackEvent> {
        self.events.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl PlaybackObserver for EventQueue {
    fn on_start_playback(&self) {
        self.events.lock().push_back(PlaybackEvent::Started);
    }

    fn on_stop_playback(&self) {
        self.events.lock().push_back(PlaybackEvent::Stopped);
    }

    fn on_completion(&self) {
        self.events.lock().push_back(PlaybackEvent::Completed);
    }
}
