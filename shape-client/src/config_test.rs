use std::sync::{Mutex, MutexGuard};

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that touch process environment.
fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_lock`].
unsafe fn clear_tacmap_env() {
    unsafe {
        std::env::remove_var("TACMAP_STORE_URL");
        std::env::remove_var("TACMAP_SHAPES_PATH");
        std::env::remove_var("TACMAP_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("TACMAP_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_lock();
    unsafe { clear_tacmap_env() };

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg.base_url, DEFAULT_STORE_URL);
    assert_eq!(cfg.shapes_path, DEFAULT_SHAPES_PATH);
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg, ClientConfig::default());
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_tacmap_env();
        std::env::set_var("TACMAP_STORE_URL", "https://store.example.test/");
        std::env::set_var("TACMAP_SHAPES_PATH", "api/shapes/");
        std::env::set_var("TACMAP_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("TACMAP_CONNECT_TIMEOUT_SECS", "2");
    }

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg.base_url, "https://store.example.test");
    assert_eq!(cfg.shapes_path, "/api/shapes");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });

    unsafe { clear_tacmap_env() };
}

#[test]
fn from_env_ignores_unparsable_timeouts() {
    let _guard = env_lock();
    unsafe {
        clear_tacmap_env();
        std::env::set_var("TACMAP_REQUEST_TIMEOUT_SECS", "soon");
    }

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_tacmap_env() };
}

#[test]
fn urls_join_base_path_and_id() {
    let cfg = ClientConfig::new("http://localhost:3001", "/shapes");
    assert_eq!(cfg.collection_url(), "http://localhost:3001/shapes");
    assert_eq!(cfg.shape_url("abc"), "http://localhost:3001/shapes/abc");
}
