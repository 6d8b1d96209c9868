// Test doubles for driving the controller without a platform player

use crate::backend::{BackendFactory, PlayerBackend, SessionId};
use crate::error::{MediaError, Result};
use crate::observer::{PlaybackEvent, PlaybackObserver};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Backend calls recorded by the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Create(String),
    Start,
    Pause,
    Stop,
    SeekTo(i64),
    Release,
}

struct MockPlayer {
    playing: bool,
    position_ms: i64,
    duration_ms: i64,
    prepared: bool,
}

struct MockShared {
    calls: Vec<BackendCall>,
    failing_locators: HashSet<String>,
    fail_start: bool,
    duration_ms: i64,
    deferred_prepare: bool,
    players: Vec<Arc<Mutex<MockPlayer>>>,
    session_ids: Vec<SessionId>,
}

impl Default for MockShared {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            failing_locators: HashSet::new(),
            fail_start: false,
            duration_ms: 60_000,
            deferred_prepare: false,
            players: Vec::new(),
            session_ids: Vec::new(),
        }
    }
}

/// Factory producing in-memory backends
pub struct MockBackendFactory {
    shared: Arc<Mutex<MockShared>>,
}

impl MockBackendFactory {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(MockShared::default())),
        }
    }

    /// Handle for scripting and inspecting backends after the factory moves
    /// into a controller
    pub fn handle(&self) -> MockBackendHandle {
        MockBackendHandle {
            shared: self.shared.clone(),
        }
    }
}

impl Default for MockBackendFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendFactory for MockBackendFactory {
    fn create(&mut self, session_id: SessionId, locator: &str) -> Result<Box<dyn PlayerBackend>> {
        let mut shared = self.shared.lock();
        shared.session_ids.push(session_id);
        shared.calls.push(BackendCall::Create(locator.to_string()));

        if shared.failing_locators.contains(locator) {
            return Err(MediaError::Load(format!("cannot open {}", locator)));
        }

        let player = Arc::new(Mutex::new(MockPlayer {
            playing: false,
            position_ms: 0,
            duration_ms: shared.duration_ms,
            prepared: !shared.deferred_prepare,
        }));
        shared.players.push(player.clone());

        Ok(Box::new(MockBackend {
            player,
            shared: self.shared.clone(),
        }))
    }
}

struct MockBackend {
    player: Arc<Mutex<MockPlayer>>,
    shared: Arc<Mutex<MockShared>>,
}

impl MockBackend {
    fn record(&self, call: BackendCall) {
        self.shared.lock().calls.push(call);
    }
}

impl PlayerBackend for MockBackend {
    fn start(&mut self) -> Result<()> {
        self.record(BackendCall::Start);
        if self.shared.lock().fail_start {
            return Err(MediaError::Backend("start failed".into()));
        }
        self.player.lock().playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(BackendCall::Pause);
        self.player.lock().playing = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.record(BackendCall::Stop);
        self.player.lock().playing = false;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: i64) -> Result<()> {
        self.record(BackendCall::SeekTo(position_ms));
        self.player.lock().position_ms = position_ms;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.player.lock().playing
    }

    fn duration(&self) -> i64 {
        self.player.lock().duration_ms
    }

    fn current_position(&self) -> i64 {
        self.player.lock().position_ms
    }

    fn is_prepared(&self) -> bool {
        self.player.lock().prepared
    }

    fn release(&mut self) -> Result<()> {
        self.record(BackendCall::Release);
        self.player.lock().playing = false;
        Ok(())
    }
}

/// Scripting and inspection handle shared with a [`MockBackendFactory`]
#[derive(Clone)]
pub struct MockBackendHandle {
    shared: Arc<Mutex<MockShared>>,
}

impl MockBackendHandle {
    pub fn calls(&self) -> Vec<BackendCall> {
        self.shared.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.shared.lock().calls.clear();
    }

    pub fn count(&self, call: &BackendCall) -> usize {
        self.shared.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// Make `create` fail for a locator
    pub fn fail_on(&self, locator: &str) {
        self.shared.lock().failing_locators.insert(locator.to_string());
    }

    /// Make every `start` call fail
    pub fn fail_start(&self, fail: bool) {
        self.shared.lock().fail_start = fail;
    }

    /// Duration given to backends created from now on
    pub fn set_duration(&self, duration_ms: i64) {
        self.shared.lock().duration_ms = duration_ms;
    }

    /// Backends created from now on report not prepared until the host
    /// delivers a prepared event
    pub fn defer_prepare(&self, deferred: bool) {
        self.shared.lock().deferred_prepare = deferred;
    }

    /// Move the most recently created backend to a position
    pub fn set_position(&self, position_ms: i64) {
        if let Some(player) = self.shared.lock().players.last() {
            player.lock().position_ms = position_ms;
        }
    }

    /// Flip the playing flag of the most recently created backend, as a
    /// platform player does when it reaches the end of the media
    pub fn set_playing(&self, playing: bool) {
        if let Some(player) = self.shared.lock().players.last() {
            player.lock().playing = playing;
        }
    }

    pub fn created(&self) -> usize {
        self.shared.lock().players.len()
    }

    /// Session ids passed to `create`, including failed loads
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.shared.lock().session_ids.clone()
    }
}

/// Observer that records every event it receives
pub struct RecordingObserver {
    events: Mutex<Vec<PlaybackEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: PlaybackEvent) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackObserver for RecordingObserver {
    fn on_start_playback(&self) {
        self.events.lock().push(PlaybackEvent::Started);
    }

    fn on_stop_playback(&self) {
        self.events.lock().push(PlaybackEvent::Stopped);
    }

    fn on_completion(&self) {
        self.events.lock().push(PlaybackEvent::Completed);
    }
}
