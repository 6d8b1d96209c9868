// JNI bindings for Android
// Bridges com.kevintcoughlin.smodr.services.NativeMediaService to the Rust service.
//
// The Kotlin side supplies two objects:
// - a backend factory with `Object create(long sessionId, String locator)`,
//   returning a player object or null when the locator can't be opened;
// - a playback listener with onStartPlayback/onStopPlayback/onCompletion.
// Player objects expose start/pause/stop/release/seekTo/isPlaying/getDuration/
// getCurrentPosition/isPrepared and report their MediaPlayer callbacks through
// nativeOnPrepared/nativeOnCompletion/nativeOnError with their session id.

use crate::config::ServiceConfig;
use crate::event_queue::EventQueue;
use crate::intent::Intent;
use crate::logging::init_logging;
use crate::registry::{
    install_with_rollback, register_service, to_code, unregister_service, with_service,
    with_service_mut,
};
use crate::service::MediaService;
use jni::objects::{GlobalRef, JClass, JObject, JString};
use jni::sys::{jboolean, jint, jlong, JNI_FALSE, JNI_TRUE};
use jni::{JNIEnv, JavaVM};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use smodr_core::{
    BackendFactory, MediaError, PlaybackEvent, PlayerBackend, Result, SessionId,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Registered Java listener and the queue its events wait in
struct Listener {
    target: GlobalRef,
    queue: Arc<EventQueue>,
}

static LISTENERS: Lazy<Mutex<HashMap<i64, Listener>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn jni_error(err: jni::errors::Error) -> MediaError {
    MediaError::Jni(err.to_string())
}

/// A Java object called from whichever thread holds the service lock
struct JavaObject {
    vm: JavaVM,
    target: GlobalRef,
}

impl JavaObject {
    fn new(env: &JNIEnv, object: &JObject) -> Result<Self> {
        Ok(Self {
            vm: env.get_java_vm().map_err(jni_error)?,
            target: env.new_global_ref(object).map_err(jni_error)?,
        })
    }

    fn with_env<R>(&self, f: impl FnOnce(&mut JNIEnv) -> jni::errors::Result<R>) -> Result<R> {
        let mut env = self.vm.attach_current_thread().map_err(jni_error)?;
        let result = f(&mut env);
        clear_exception(&mut env);
        result.map_err(jni_error)
    }

    fn call_void(&self, name: &str) -> Result<()> {
        self.with_env(|env| env.call_method(&self.target, name, "()V", &[])?.v())
    }

    fn call_bool(&self, name: &str) -> Result<bool> {
        self.with_env(|env| env.call_method(&self.target, name, "()Z", &[])?.z())
    }

    fn call_int(&self, name: &str) -> Result<i32> {
        self.with_env(|env| env.call_method(&self.target, name, "()I", &[])?.i())
    }
}

fn clear_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

/// Backend factory implemented by a Kotlin object
struct JniBackendFactory {
    factory: JavaObject,
}

impl BackendFactory for JniBackendFactory {
    fn create(&mut self, session_id: SessionId, locator: &str) -> Result<Box<dyn PlayerBackend>> {
        let factory = &self.factory;
        let player = factory.with_env(|env| {
            let jlocator = env.new_string(locator)?;
            let object = env
                .call_method(
                    &factory.target,
                    "create",
                    "(JLjava/lang/String;)Ljava/lang/Object;",
                    &[(session_id as jlong).into(), (&jlocator).into()],
                )?
                .l()?;
            if object.is_null() {
                return Ok(None);
            }
            env.new_global_ref(object).map(Some)
        })?;

        let target = player.ok_or_else(|| MediaError::Load(format!("no player for {}", locator)))?;
        let vm = factory
            .with_env(|env| env.get_java_vm())?;

        Ok(Box::new(JniBackend {
            player: JavaObject { vm, target },
        }))
    }
}

/// Player backend implemented by a Kotlin object wrapping MediaPlayer
struct JniBackend {
    player: JavaObject,
}

impl PlayerBackend for JniBackend {
    fn start(&mut self) -> Result<()> {
        self.player.call_void("start")
    }

    fn pause(&mut self) -> Result<()> {
        self.player.call_void("pause")
    }

    fn stop(&mut self) -> Result<()> {
        self.player.call_void("stop")
    }

    fn seek_to(&mut self, position_ms: i64) -> Result<()> {
        let position = position_ms.clamp(i32::MIN as i64, i32::MAX as i64) as jint;
        self.player.with_env(|env| {
            env.call_method(&self.player.target, "seekTo", "(I)V", &[position.into()])?
                .v()
        })
    }

    fn is_playing(&self) -> bool {
        self.player.call_bool("isPlaying").unwrap_or_else(|e| {
            log::warn!("isPlaying failed: {}", e);
            false
        })
    }

    fn duration(&self) -> i64 {
        self.player.call_int("getDuration").map(i64::from).unwrap_or(-1)
    }

    fn current_position(&self) -> i64 {
        self.player
            .call_int("getCurrentPosition")
            .map(i64::from)
            .unwrap_or(-1)
    }

    fn is_prepared(&self) -> bool {
        self.player.call_bool("isPrepared").unwrap_or(true)
    }

    fn release(&mut self) -> Result<()> {
        self.player.call_void("release")
    }
}

// Helper function to convert Java string to Rust string
fn jstring_to_string(env: &mut JNIEnv, jstr: &JString) -> Result<String> {
    let java_str = env.get_string(jstr).map_err(jni_error)?;
    Ok(java_str.into())
}

/// Deliver queued observer events for `id` once the service lock is free
fn flush_events(env: &mut JNIEnv, id: i64) {
    let (target, events) = {
        let listeners = LISTENERS.lock();
        match listeners.get(&id) {
            Some(listener) => (listener.target.clone(), listener.queue.drain()),
            None => return,
        }
    };

    for event in events {
        let method = match event {
            PlaybackEvent::Started => "onStartPlayback",
            PlaybackEvent::Stopped => "onStopPlayback",
            PlaybackEvent::Completed => "onCompletion",
        };
        if let Err(e) = env.call_method(&target, method, "()V", &[]) {
            log::error!("Listener {} failed: {}", method, e);
            clear_exception(env);
        }
    }
}

/// Run `f` against the service, then deliver any events it produced
fn dispatch<R>(env: &mut JNIEnv, id: i64, f: impl FnOnce(&mut MediaService) -> R) -> Result<R> {
    let result = with_service_mut(id, f);
    flush_events(env, id);
    result
}

fn as_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Create a service. Returns its handle, or -1 on failure.
#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeCreate(
    mut env: JNIEnv,
    _class: JClass,
    factory: JObject,
    config_json: JString,
) -> jlong {
    let config = if config_json.is_null() {
        Ok(ServiceConfig::default())
    } else {
        jstring_to_string(&mut env, &config_json).and_then(|json| ServiceConfig::from_json(&json))
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_logging(&Default::default());
            log::error!("Invalid service config: {}", e);
            return -1;
        }
    };
    init_logging(&config.log);

    if factory.is_null() {
        log::error!("nativeCreate called without a backend factory");
        return -1;
    }

    let service = JavaObject::new(&env, &factory)
        .map(|factory| JniBackendFactory { factory })
        .and_then(|factory| MediaService::new(Box::new(factory), config));

    match service {
        Ok(service) => register_service(service),
        Err(e) => {
            log::error!("Failed to create media service: {}", e);
            -1
        }
    }
}

/// Dispatch an intent serialised as JSON. Returns the start mode code.
#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeOnStartCommand(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    intent_json: JString,
) -> jint {
    let intent = jstring_to_string(&mut env, &intent_json).and_then(|json| Intent::from_json(&json));
    let intent = match intent {
        Ok(intent) => intent,
        Err(e) => {
            log::debug!("Ignoring unreadable intent: {}", e);
            Intent::default()
        }
    };

    match dispatch(&mut env, handle, |s| s.on_start_command(&intent)) {
        Ok(mode) => mode.code(),
        Err(e) => {
            log::error!("onStartCommand failed: {}", e);
            -1
        }
    }
}

/// Register a listener, or deregister with null
#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeSetPlaybackListener(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
    listener: JObject,
) -> jint {
    if listener.is_null() {
        LISTENERS.lock().remove(&handle);
        return to_code(with_service_mut(handle, |s| s.set_playback_listener(None)));
    }

    let target = match env.new_global_ref(&listener) {
        Ok(target) => target,
        Err(e) => {
            log::error!("Failed to retain listener: {}", e);
            return -1;
        }
    };
    let queue = Arc::new(EventQueue::new());
    // The listener must be findable before the service can queue into it
    let listener = Listener {
        target,
        queue: queue.clone(),
    };
    let result = install_with_rollback(&*LISTENERS, handle, listener, || {
        with_service_mut(handle, |s| s.set_playback_listener(Some(queue)))
    });
    to_code(result)
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativePlay(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    locator: JString,
) -> jint {
    match jstring_to_string(&mut env, &locator) {
        Ok(locator) => to_code(dispatch(&mut env, handle, |s| {
            s.controller_mut().play(&locator)
        })),
        Err(e) => {
            log::error!("Failed to read locator: {}", e);
            -1
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeResume(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| s.controller_mut().resume()))
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativePause(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| s.controller_mut().pause()))
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeStop(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| s.controller_mut().stop()))
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeSeekTo(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    position_ms: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| {
        s.controller_mut().seek(position_ms)
    }))
}

/// Skip ahead. Bound clients get the literal direction; only intents honour
/// the swapped FORWARD/REWIND binding.
#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeForward(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| s.controller_mut().skip_forward()))
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeRewind(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| s.controller_mut().skip_backward()))
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeIsPlaying(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jboolean {
    as_jboolean(with_service(handle, |s| s.controller().is_playing()).unwrap_or(false))
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeGetDuration(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jlong {
    with_service(handle, |s| s.controller().duration()).unwrap_or(-1)
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeGetCurrentTime(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jlong {
    with_service(handle, |s| s.controller().current_position()).unwrap_or(-1)
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeGetRemainingTime(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jlong {
    with_service(handle, |s| s.controller().remaining_time()).unwrap_or(-1)
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeGetState(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jint {
    with_service(handle, |s| s.controller().state().code()).unwrap_or(-1)
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeOnPrepared(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    session_id: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| s.on_prepared(session_id as SessionId)))
}

#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeOnCompletion(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    session_id: jlong,
) -> jint {
    to_code(dispatch(&mut env, handle, |s| {
        s.on_completion(session_id as SessionId)
    }))
}

/// MediaPlayer.OnErrorListener. Always reports the error as handled.
#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeOnError(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    session_id: jlong,
    what: jint,
    extra: jint,
) -> jboolean {
    let result = dispatch(&mut env, handle, |s| {
        s.on_error(session_id as SessionId, what, extra)
    });
    if let Err(e) = &result {
        log::error!("onError for unknown service: {}", e);
    }
    as_jboolean(true)
}

/// Service.onDestroy: stop, release, and drop the handle
#[no_mangle]
pub extern "system" fn Java_com_kevintcoughlin_smodr_services_NativeMediaService_nativeDestroy(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jint {
    let result = dispatch(&mut env, handle, |s| s.on_destroy());
    LISTENERS.lock().remove(&handle);
    to_code(result.and_then(|_| unregister_service(handle).map(drop)))
}
