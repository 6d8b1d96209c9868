// Playback controller: one session, one backend handle, one observer

use crate::backend::{BackendEvent, BackendFactory, PlayerBackend, SessionId};
use crate::command::MediaCommand;
use crate::config::ControllerConfig;
use crate::observer::{ObserverSlot, PlaybackEvent, PlaybackObserver};
use crate::state::{PlaybackState, PlaybackStatus};
use std::sync::Arc;

/// Live binding between the controller and one loaded locator.
/// Dropping the session releases the backend handle.
struct Session {
    id: SessionId,
    locator: String,
    backend: Box<dyn PlayerBackend>,
}

impl Drop for Session {
    fn drop(&mut self) {
        log::info!("Releasing session {} ({})", self.id, self.locator);
        if let Err(e) = self.backend.release() {
            log::error!("Failed to release backend for session {}: {}", self.id, e);
        }
    }
}

/// Translates commands into backend calls and relays lifecycle events.
///
/// Every public operation absorbs backend failures: errors are logged and
/// reflected only through state (`is_playing` false, queries returning -1).
/// All calls are expected on a single control thread.
pub struct PlaybackController {
    factory: Box<dyn BackendFactory>,
    config: ControllerConfig,
    session: Option<Session>,
    state: PlaybackState,
    observer: ObserverSlot,
    next_session_id: SessionId,
}

impl PlaybackController {
    pub fn new(factory: Box<dyn BackendFactory>, config: ControllerConfig) -> Self {
        log::info!("PlaybackController::new {:?}", config);
        Self {
            factory,
            config,
            session: None,
            state: PlaybackState::NoSession,
            observer: ObserverSlot::new(),
            next_session_id: 1,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn locator(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.locator.as_str())
    }

    /// Replace the observer. `None` deregisters.
    pub fn set_observer(&mut self, observer: Option<Arc<dyn PlaybackObserver>>) {
        self.observer.set(observer);
    }

    /// Load `locator` and start playing it.
    ///
    /// A playing session is stopped first, which emits a stop event before
    /// the new start event. Any previous backend handle is released before
    /// the new one is created. Load failures leave the controller without a
    /// session and emit nothing.
    pub fn play(&mut self, locator: &str) {
        log::info!("play {}", locator);

        if self.is_playing() {
            self.stop();
        }
        self.session = None;
        self.transition(PlaybackState::Loading);

        let id = self.next_session_id;
        self.next_session_id += 1;

        let backend = match self.factory.create(id, locator) {
            Ok(backend) => backend,
            Err(e) => {
                log::error!("Failed to load {}: {}", locator, e);
                self.transition(PlaybackState::NoSession);
                return;
            }
        };

        let prepared = backend.is_prepared();
        self.session = Some(Session {
            id,
            locator: locator.to_string(),
            backend,
        });

        if prepared {
            self.begin_playback();
        } else {
            log::debug!("Session {} waiting for backend to prepare", id);
        }
    }

    /// Start the freshly loaded session. A backend that refuses to start is
    /// treated like a failed load.
    fn begin_playback(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if let Err(e) = session.backend.start() {
            log::error!("Failed to start {}: {}", session.locator, e);
            self.session = None;
            self.transition(PlaybackState::NoSession);
            return;
        }

        self.transition(PlaybackState::Playing);
        self.observer.notify(PlaybackEvent::Started);
    }

    /// Continue the current session. The start event fires even without a
    /// session.
    pub fn resume(&mut self) {
        if let Some(session) = self.session.as_mut() {
            match session.backend.start() {
                Ok(()) => self.transition(PlaybackState::Playing),
                Err(e) => log::warn!("Failed to resume session {}: {}", session.id, e),
            }
        }
        self.observer.notify(PlaybackEvent::Started);
    }

    /// Pause the current session. The stop event fires even without a
    /// session. A session paused while loading stays idle when the backend
    /// reports prepared, until `resume`.
    pub fn pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            match session.backend.pause() {
                Ok(()) => self.transition(PlaybackState::Paused),
                Err(e) => log::warn!("Failed to pause session {}: {}", session.id, e),
            }
        }
        self.observer.notify(PlaybackEvent::Stopped);
    }

    /// Stop the current session without releasing its backend handle. The
    /// stop event fires even without a session.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.backend.stop() {
                log::warn!("Failed to stop session {}: {}", session.id, e);
            }
            self.transition(PlaybackState::Stopped);
        }
        self.observer.notify(PlaybackEvent::Stopped);
    }

    /// Seek to `position_ms`. No bounds checks at this layer.
    pub fn seek(&mut self, position_ms: i64) {
        if let Some(session) = self.session.as_mut() {
            log::debug!("seek session {} -> {} ms", session.id, position_ms);
            if let Err(e) = session.backend.seek_to(position_ms) {
                log::warn!("Failed to seek session {}: {}", session.id, e);
            }
        }
    }

    /// Skip ahead by the configured interval, clamped at the duration
    pub fn skip_forward(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let mut target = session
            .backend
            .current_position()
            .saturating_add(self.config.skip_interval_ms);
        let duration = session.backend.duration();
        // A negative duration means the backend doesn't know it (live streams)
        if self.config.clamp_skip_to_duration && duration >= 0 {
            target = target.min(duration);
        }
        self.seek(target);
    }

    /// Skip back by the configured interval. The target is not clamped at
    /// zero; the backend decides what a negative position means.
    pub fn skip_backward(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let target = session
            .backend
            .current_position()
            .saturating_sub(self.config.skip_interval_ms);
        self.seek(target);
    }

    pub fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.backend.is_playing())
            .unwrap_or(false)
    }

    /// Total duration in milliseconds, -1 without a session
    pub fn duration(&self) -> i64 {
        self.session
            .as_ref()
            .map(|s| s.backend.duration())
            .unwrap_or(-1)
    }

    /// Current position in milliseconds, -1 without a session
    pub fn current_position(&self) -> i64 {
        self.session
            .as_ref()
            .map(|s| s.backend.current_position())
            .unwrap_or(-1)
    }

    /// Duration minus position, -1 without a session
    pub fn remaining_time(&self) -> i64 {
        match &self.session {
            Some(s) => s.backend.duration().saturating_sub(s.backend.current_position()),
            None => -1,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.state,
            session_id: self.active_session_id(),
            locator: self.locator().map(str::to_string),
            position_ms: self.current_position(),
            duration_ms: self.duration(),
            playing: self.is_playing(),
        }
    }

    /// Route a dispatched command. FORWARD and REWIND honour
    /// `swap_skip_commands`.
    pub fn execute(&mut self, command: MediaCommand) {
        log::debug!("execute {}", command.name());
        let swap = self.config.swap_skip_commands;

        match command {
            MediaCommand::Play(locator) => self.play(&locator),
            MediaCommand::Pause => self.pause(),
            MediaCommand::Resume => self.resume(),
            MediaCommand::Stop => self.stop(),
            MediaCommand::Forward if swap => self.skip_backward(),
            MediaCommand::Forward => self.skip_forward(),
            MediaCommand::Rewind if swap => self.skip_forward(),
            MediaCommand::Rewind => self.skip_backward(),
        }
    }

    /// Deliver a backend callback for `session_id`.
    ///
    /// Returns whether the event was handled. Errors are always reported as
    /// handled; callbacks for sessions that are no longer active are dropped.
    pub fn handle_backend_event(&mut self, session_id: SessionId, event: BackendEvent) -> bool {
        if self.active_session_id() != Some(session_id) {
            log::debug!(
                "Dropping {:?} for stale session {} (active: {:?})",
                event,
                session_id,
                self.active_session_id()
            );
            return matches!(event, BackendEvent::Error { .. });
        }

        match event {
            BackendEvent::Prepared => {
                if self.state == PlaybackState::Loading {
                    self.begin_playback();
                    true
                } else {
                    log::debug!("Ignoring prepared in state {:?}", self.state);
                    false
                }
            }
            BackendEvent::Completed => {
                self.observer.notify(PlaybackEvent::Completed);
                true
            }
            BackendEvent::Error { what, extra } => {
                log::error!(
                    "Backend error on session {}: what={} extra={}",
                    session_id,
                    what,
                    extra
                );
                self.stop();
                true
            }
        }
    }

    /// Stop playback, release the backend, and drop the observer
    pub fn shutdown(&mut self) {
        log::info!("PlaybackController::shutdown");
        self.stop();
        self.session = None;
        self.transition(PlaybackState::NoSession);
        self.observer.clear();
    }

    fn transition(&mut self, to: PlaybackState) {
        if self.state == to {
            return;
        }
        if self.state.can_transition_to(to) {
            log::debug!("Playback state changed: {:?} -> {:?}", self.state, to);
            self.state = to;
        } else {
            log::debug!("Ignoring transition {:?} -> {:?}", self.state, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BackendCall, MockBackendFactory, MockBackendHandle, RecordingObserver};

    fn controller() -> (PlaybackController, MockBackendHandle, Arc<RecordingObserver>) {
        controller_with(ControllerConfig::default())
    }

    fn controller_with(
        config: ControllerConfig,
    ) -> (PlaybackController, MockBackendHandle, Arc<RecordingObserver>) {
        let factory = MockBackendFactory::new();
        let handle = factory.handle();
        let observer = Arc::new(RecordingObserver::new());
        let mut controller = PlaybackController::new(Box::new(factory), config);
        controller.set_observer(Some(observer.clone()));
        (controller, handle, observer)
    }

    #[test]
    fn test_controls_without_session_are_noops() {
        let (mut controller, handle, observer) = controller();

        controller.pause();
        controller.resume();
        controller.stop();
        controller.seek(1_000);
        controller.skip_forward();
        controller.skip_backward();

        assert!(!controller.is_playing());
        assert_eq!(controller.state(), PlaybackState::NoSession);
        assert!(handle.calls().is_empty());
        // events still fire without a session
        assert_eq!(
            observer.events(),
            vec![
                PlaybackEvent::Stopped,
                PlaybackEvent::Started,
                PlaybackEvent::Stopped
            ]
        );
    }

    #[test]
    fn test_queries_without_session_return_sentinel() {
        let (controller, _, _) = controller();

        assert_eq!(controller.duration(), -1);
        assert_eq!(controller.current_position(), -1);
        assert_eq!(controller.remaining_time(), -1);
        assert_eq!(controller.status(), PlaybackStatus::default());
    }

    #[test]
    fn test_play_starts_and_notifies_once() {
        let (mut controller, handle, observer) = controller();

        controller.play("file://a.mp3");

        assert!(controller.is_playing());
        assert_eq!(controller.state(), PlaybackState::Playing);
        assert_eq!(observer.events(), vec![PlaybackEvent::Started]);
        assert_eq!(
            handle.calls(),
            vec![BackendCall::Create("file://a.mp3".into()), BackendCall::Start]
        );
        assert_eq!(controller.locator(), Some("file://a.mp3"));
        assert_eq!(handle.session_ids(), vec![1]);
        assert_eq!(controller.active_session_id(), Some(1));
    }

    #[test]
    fn test_deferred_prepare_starts_on_prepared_event() {
        let (mut controller, handle, observer) = controller();
        handle.defer_prepare(true);

        controller.play("https://example.com/episode.mp3");
        assert_eq!(controller.state(), PlaybackState::Loading);
        assert!(observer.events().is_empty());

        let id = controller.active_session_id().unwrap();
        assert!(controller.handle_backend_event(id, BackendEvent::Prepared));
        assert!(controller.is_playing());
        assert_eq!(observer.events(), vec![PlaybackEvent::Started]);

        // a second prepared must not start again
        assert!(!controller.handle_backend_event(id, BackendEvent::Prepared));
        assert_eq!(observer.count(PlaybackEvent::Started), 1);
    }

    #[test]
    fn test_pause_while_loading_stays_paused_after_prepared() {
        let (mut controller, handle, observer) = controller();
        handle.defer_prepare(true);

        controller.play("https://example.com/episode.mp3");
        controller.pause();
        assert_eq!(controller.state(), PlaybackState::Paused);

        let id = controller.active_session_id().unwrap();
        assert!(!controller.handle_backend_event(id, BackendEvent::Prepared));

        assert!(!controller.is_playing());
        assert_eq!(controller.state(), PlaybackState::Paused);
        assert_eq!(handle.count(&BackendCall::Start), 0);
        assert_eq!(observer.events(), vec![PlaybackEvent::Stopped]);

        controller.resume();
        assert!(controller.is_playing());
        assert_eq!(controller.state(), PlaybackState::Playing);
        assert_eq!(observer.count(PlaybackEvent::Started), 1);
    }

    #[test]
    fn test_failed_load_leaves_no_session() {
        let (mut controller, handle, observer) = controller();
        handle.fail_on("file://missing.mp3");

        controller.play("file://missing.mp3");

        assert!(!controller.is_playing());
        assert_eq!(controller.state(), PlaybackState::NoSession);
        assert_eq!(controller.active_session_id(), None);
        assert!(observer.events().is_empty());
        assert_eq!(controller.duration(), -1);
    }

    #[test]
    fn test_failed_start_releases_backend() {
        let (mut controller, handle, observer) = controller();
        handle.fail_start(true);

        controller.play("file://a.mp3");

        assert_eq!(controller.state(), PlaybackState::NoSession);
        assert_eq!(handle.count(&BackendCall::Release), 1);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_replacing_playing_session_stops_then_starts() {
        let (mut controller, handle, observer) = controller();

        controller.play("file://a.mp3");
        let first = controller.active_session_id();
        observer.clear();
        handle.clear_calls();

        controller.play("file://b.mp3");

        assert_eq!(
            observer.events(),
            vec![PlaybackEvent::Stopped, PlaybackEvent::Started]
        );
        assert_eq!(
            handle.calls(),
            vec![
                BackendCall::Stop,
                BackendCall::Release,
                BackendCall::Create("file://b.mp3".into()),
                BackendCall::Start,
            ]
        );
        assert_ne!(controller.active_session_id(), first);
    }

    #[test]
    fn test_replacing_paused_session_is_silent() {
        let (mut controller, handle, observer) = controller();

        controller.play("file://a.mp3");
        controller.pause();
        observer.clear();

        controller.play("file://b.mp3");

        assert_eq!(observer.events(), vec![PlaybackEvent::Started]);
        assert_eq!(handle.count(&BackendCall::Release), 1);
        assert_eq!(handle.created(), 2);
    }

    #[test]
    fn test_failed_reload_releases_previous_session() {
        let (mut controller, handle, _) = controller();
        handle.fail_on("file://bad.mp3");

        controller.play("file://a.mp3");
        controller.play("file://bad.mp3");

        assert_eq!(controller.active_session_id(), None);
        assert_eq!(handle.count(&BackendCall::Release), 1);
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_pause_resume_stop_transitions() {
        let (mut controller, _, observer) = controller();
        controller.play("file://a.mp3");

        controller.pause();
        assert_eq!(controller.state(), PlaybackState::Paused);
        assert!(!controller.is_playing());

        controller.resume();
        assert_eq!(controller.state(), PlaybackState::Playing);
        assert!(controller.is_playing());

        controller.stop();
        assert_eq!(controller.state(), PlaybackState::Stopped);
        // stopped sessions stay allocated
        assert!(controller.active_session_id().is_some());
        assert_eq!(controller.duration(), 60_000);

        controller.resume();
        assert_eq!(controller.state(), PlaybackState::Playing);

        assert_eq!(
            observer.events(),
            vec![
                PlaybackEvent::Started,
                PlaybackEvent::Stopped,
                PlaybackEvent::Started,
                PlaybackEvent::Stopped,
                PlaybackEvent::Started,
            ]
        );
    }

    #[test]
    fn test_skip_forward_clamps_to_duration() {
        let (mut controller, handle, _) = controller();
        handle.set_duration(60_000);
        controller.play("file://a.mp3");
        handle.set_position(50_000);
        handle.clear_calls();

        controller.skip_forward();

        assert_eq!(handle.calls(), vec![BackendCall::SeekTo(60_000)]);
        assert!(controller.current_position() <= controller.duration());
        assert_eq!(controller.remaining_time(), 0);
    }

    #[test]
    fn test_skip_forward_within_duration() {
        let (mut controller, handle, _) = controller();
        handle.set_duration(120_000);
        controller.play("file://a.mp3");
        handle.set_position(10_000);

        controller.skip_forward();

        assert_eq!(controller.current_position(), 40_000);
        assert_eq!(controller.remaining_time(), 80_000);
    }

    #[test]
    fn test_skip_forward_unknown_duration_is_unclamped() {
        let (mut controller, handle, _) = controller();
        handle.set_duration(-1);
        controller.play("https://example.com/live");
        handle.set_position(5_000);

        controller.skip_forward();

        assert_eq!(controller.current_position(), 35_000);
    }

    #[test]
    fn test_skip_forward_without_clamp_passes_duration() {
        let config = ControllerConfig {
            clamp_skip_to_duration: false,
            ..ControllerConfig::default()
        };
        let (mut controller, handle, _) = controller_with(config);
        handle.set_duration(60_000);
        controller.play("file://a.mp3");
        handle.set_position(50_000);
        handle.clear_calls();

        controller.skip_forward();

        assert_eq!(handle.calls(), vec![BackendCall::SeekTo(80_000)]);
        assert!(controller.current_position() > controller.duration());
        assert_eq!(controller.remaining_time(), -20_000);
    }

    #[test]
    fn test_huge_skip_interval_saturates() {
        let config = ControllerConfig {
            skip_interval_ms: i64::MAX,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_ok());
        let (mut controller, handle, _) = controller_with(config);
        handle.set_duration(60_000);
        controller.play("file://a.mp3");
        handle.set_position(10_000);
        handle.clear_calls();

        controller.skip_forward();
        assert_eq!(controller.current_position(), 60_000);

        handle.set_position(-10);
        controller.skip_backward();

        assert_eq!(
            handle.calls(),
            vec![BackendCall::SeekTo(60_000), BackendCall::SeekTo(i64::MIN)]
        );
    }

    #[test]
    fn test_huge_skip_interval_unclamped_saturates_at_max() {
        let config = ControllerConfig {
            skip_interval_ms: i64::MAX,
            clamp_skip_to_duration: false,
            ..ControllerConfig::default()
        };
        let (mut controller, handle, _) = controller_with(config);
        controller.play("file://a.mp3");
        handle.set_position(10_000);

        controller.skip_forward();

        assert_eq!(controller.current_position(), i64::MAX);
        assert_eq!(controller.remaining_time(), 60_000 - i64::MAX);
    }

    #[test]
    fn test_skip_backward_is_unclamped() {
        let (mut controller, handle, _) = controller();
        controller.play("file://a.mp3");
        handle.set_position(10_000);
        handle.clear_calls();

        controller.skip_backward();

        assert_eq!(handle.calls(), vec![BackendCall::SeekTo(-20_000)]);
    }

    #[test]
    fn test_seek_passes_value_through() {
        let (mut controller, handle, _) = controller();
        controller.play("file://a.mp3");
        handle.clear_calls();

        controller.seek(90_000);

        assert_eq!(handle.calls(), vec![BackendCall::SeekTo(90_000)]);
    }

    #[test]
    fn test_custom_skip_interval() {
        let config = ControllerConfig {
            skip_interval_ms: 15_000,
            ..ControllerConfig::default()
        };
        let (mut controller, handle, _) = controller_with(config);
        controller.play("file://a.mp3");
        handle.set_position(20_000);

        controller.skip_backward();

        assert_eq!(controller.current_position(), 5_000);
    }

    #[test]
    fn test_forward_command_rewinds_by_default() {
        let (mut controller, handle, _) = controller();
        controller.play("file://a.mp3");
        handle.set_position(40_000);

        controller.execute(MediaCommand::Forward);
        assert_eq!(controller.current_position(), 10_000);

        controller.execute(MediaCommand::Rewind);
        assert_eq!(controller.current_position(), 40_000);
    }

    #[test]
    fn test_unswapped_skip_commands() {
        let config = ControllerConfig {
            swap_skip_commands: false,
            ..ControllerConfig::default()
        };
        let (mut controller, handle, _) = controller_with(config);
        controller.play("file://a.mp3");
        handle.set_position(40_000);

        controller.execute(MediaCommand::Forward);
        assert_eq!(controller.current_position(), 60_000);

        controller.execute(MediaCommand::Rewind);
        assert_eq!(controller.current_position(), 30_000);
    }

    #[test]
    fn test_last_observer_wins() {
        let (mut controller, _, first) = controller();
        let second = Arc::new(RecordingObserver::new());

        controller.set_observer(Some(second.clone()));
        controller.stop();

        assert!(first.events().is_empty());
        assert_eq!(second.events(), vec![PlaybackEvent::Stopped]);
    }

    #[test]
    fn test_completion_is_forwarded_without_teardown() {
        let (mut controller, handle, observer) = controller();
        controller.play("file://a.mp3");
        let id = controller.active_session_id().unwrap();
        handle.set_playing(false);

        assert!(controller.handle_backend_event(id, BackendEvent::Completed));

        assert_eq!(observer.count(PlaybackEvent::Completed), 1);
        assert_eq!(controller.active_session_id(), Some(id));
        assert_eq!(handle.count(&BackendCall::Stop), 0);
        assert_eq!(handle.count(&BackendCall::Release), 0);
    }

    #[test]
    fn test_backend_error_forces_stop() {
        let (mut controller, handle, observer) = controller();
        controller.play("file://a.mp3");
        let id = controller.active_session_id().unwrap();
        observer.clear();

        let handled =
            controller.handle_backend_event(id, BackendEvent::Error { what: 1, extra: -1004 });

        assert!(handled);
        assert!(!controller.is_playing());
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(handle.count(&BackendCall::Stop), 1);
        assert_eq!(observer.events(), vec![PlaybackEvent::Stopped]);
    }

    #[test]
    fn test_stale_session_events_are_dropped() {
        let (mut controller, handle, observer) = controller();
        handle.defer_prepare(true);

        controller.play("file://a.mp3");
        let stale = controller.active_session_id().unwrap();
        controller.play("file://b.mp3");
        observer.clear();

        assert!(!controller.handle_backend_event(stale, BackendEvent::Prepared));
        assert!(!controller.handle_backend_event(stale, BackendEvent::Completed));
        assert!(controller.handle_backend_event(stale, BackendEvent::Error { what: 1, extra: 0 }));

        assert_eq!(controller.state(), PlaybackState::Loading);
        assert!(observer.events().is_empty());
        assert_eq!(handle.session_ids(), vec![stale, stale + 1]);
    }

    #[test]
    fn test_shutdown_releases_once_and_clears_observer() {
        let (mut controller, handle, observer) = controller();
        controller.play("file://a.mp3");
        observer.clear();

        controller.shutdown();
        controller.stop();

        assert_eq!(observer.events(), vec![PlaybackEvent::Stopped]);
        assert_eq!(handle.count(&BackendCall::Release), 1);
        assert_eq!(controller.state(), PlaybackState::NoSession);
        assert_eq!(controller.duration(), -1);
    }

    #[test]
    fn test_drop_releases_backend() {
        let (mut controller, handle, _) = controller();
        controller.play("file://a.mp3");

        drop(controller);

        assert_eq!(handle.count(&BackendCall::Release), 1);
    }
}
