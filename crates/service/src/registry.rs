// Process-wide handle registry for services driven through native entry points

use crate::service::MediaService;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use smodr_core::{MediaError, Result};
use std::collections::HashMap;

static SERVICE_REGISTRY: Lazy<Mutex<HashMap<i64, MediaService>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_SERVICE_ID: Lazy<Mutex<i64>> = Lazy::new(|| Mutex::new(1));

/// Store a service and return its handle
pub fn register_service(service: MediaService) -> i64 {
    let mut next = NEXT_SERVICE_ID.lock();
    let id = *next;
    *next += 1;
    drop(next);

    SERVICE_REGISTRY.lock().insert(id, service);
    log::info!("Media service registered with handle {}", id);
    id
}

/// Remove a service from the registry, handing ownership back
pub fn unregister_service(id: i64) -> Result<MediaService> {
    SERVICE_REGISTRY
        .lock()
        .remove(&id)
        .ok_or(MediaError::InvalidHandle(id))
}

pub fn with_service_mut<R>(id: i64, f: impl FnOnce(&mut MediaService) -> R) -> Result<R> {
    let mut registry = SERVICE_REGISTRY.lock();
    let service = registry.get_mut(&id).ok_or(MediaError::InvalidHandle(id))?;
    Ok(f(service))
}

pub fn with_service<R>(id: i64, f: impl FnOnce(&MediaService) -> R) -> Result<R> {
    let registry = SERVICE_REGISTRY.lock();
    let service = registry.get(&id).ok_or(MediaError::InvalidHandle(id))?;
    Ok(f(service))
}

/// Publish `entry` under `id`, then run `attach`.
///
/// The entry is visible in `slots` while `attach` runs. If `attach` fails the
/// previous entry (or its absence) is restored.
pub fn install_with_rollback<T>(
    slots: &Mutex<HashMap<i64, T>>,
    id: i64,
    entry: T,
    attach: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let previous = slots.lock().insert(id, entry);
    let result = attach();
    if result.is_err() {
        let mut slots = slots.lock();
        match previous {
            Some(previous) => {
                slots.insert(id, previous);
            }
            None => {
                slots.remove(&id);
            }
        }
    }
    result
}

/// Map a result to the native status code: 0 on success, -1 on failure
pub fn to_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::error!("Native call failed: {}", err);
            -1
        }
    }
}
