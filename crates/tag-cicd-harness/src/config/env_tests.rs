// crates/tag-cicd-harness/src/config/env_tests.rs
// ============================================================================
// Module: Harness Env Unit Tests
// Description: Unit coverage for strict environment parsing.
// Purpose: Ensure configuration loading fails closed on invalid inputs.
// Dependencies: std, tempfile
// ============================================================================

//! ## Overview
//! Unit coverage for strict environment parsing in the harness.
//! Invariants:
//! - Environment parsing rejects invalid or empty values.
//! - Tests restore environment state after each run.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

use super::HarnessConfig;
use super::HarnessEnv;

mod env_mut {
    #![allow(unsafe_code, reason = "Tests mutate process env vars in a controlled scope.")]

    /// Sets an environment variable for the current process.
    pub fn set_var(key: &str, value: &str) {
        // SAFETY: Tests serialize environment mutation via a global lock.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    /// Removes an environment variable from the current process.
    pub fn remove_var(key: &str) {
        // SAFETY: Tests serialize environment mutation via a global lock.
        unsafe {
            std::env::remove_var(key);
        }
    }
}

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Snapshots the harness env vars, clears them, and restores them on drop.
struct EnvGuard {
    entries: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn clean() -> Self {
        let entries: Vec<_> = HarnessEnv::ALL
            .iter()
            .map(|key| (key.as_str(), std::env::var(key.as_str()).ok()))
            .collect();
        for (name, _) in &entries {
            env_mut::remove_var(name);
        }
        Self {
            entries,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in self.entries.drain(..) {
            match value {
                Some(value) => env_mut::set_var(name, &value),
                None => env_mut::remove_var(name),
            }
        }
    }
}

#[test]
fn load_without_env_uses_reference_defaults() {
    let _lock = env_lock();
    let _guard = EnvGuard::clean();

    let config = HarnessConfig::load().expect("defaults should load");
    assert_eq!(config, HarnessConfig::default());
    assert_eq!(config.base_url, "https://tag-cicd.localtest.me/data/tag-cicd");
    assert!(config.accept_invalid_certs);
    assert_eq!(config.timeout(), None);
}

#[test]
fn env_overrides_replace_defaults() {
    let _lock = env_lock();
    let _guard = EnvGuard::clean();

    env_mut::set_var(HarnessEnv::BaseUrl.as_str(), "http://127.0.0.1:8088/data/tag-cicd");
    env_mut::set_var(HarnessEnv::Provider.as_str(), "edge");
    env_mut::set_var(HarnessEnv::HostExportRoot.as_str(), "/mnt/tags");
    env_mut::set_var(HarnessEnv::TimeoutSeconds.as_str(), "30");
    env_mut::set_var(HarnessEnv::AcceptInvalidCerts.as_str(), "0");

    let config = HarnessConfig::load().expect("config should load");
    assert_eq!(config.base_url, "http://127.0.0.1:8088/data/tag-cicd");
    assert_eq!(config.provider, "edge");
    assert_eq!(config.host_export_root, PathBuf::from("/mnt/tags"));
    assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    assert!(!config.accept_invalid_certs);
}

#[test]
fn timeout_rejects_invalid_values() {
    let _lock = env_lock();
    let _guard = EnvGuard::clean();

    env_mut::set_var(HarnessEnv::TimeoutSeconds.as_str(), "0");
    assert!(HarnessConfig::load().is_err());

    env_mut::set_var(HarnessEnv::TimeoutSeconds.as_str(), "not-a-number");
    assert!(HarnessConfig::load().is_err());

    env_mut::set_var(HarnessEnv::TimeoutSeconds.as_str(), "   ");
    assert!(HarnessConfig::load().is_err());
}

#[test]
fn accept_invalid_certs_rejects_unknown_literals() {
    let _lock = env_lock();
    let _guard = EnvGuard::clean();

    env_mut::set_var(HarnessEnv::AcceptInvalidCerts.as_str(), "maybe");
    assert!(HarnessConfig::load().is_err());
}

#[test]
fn empty_values_fail_closed() {
    let _lock = env_lock();
    let _guard = EnvGuard::clean();

    env_mut::set_var(HarnessEnv::Provider.as_str(), "");
    assert!(HarnessConfig::load().is_err());
}

#[test]
fn config_file_is_overlaid_by_env() {
    let _lock = env_lock();
    let _guard = EnvGuard::clean();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harness.toml");
    std::fs::write(&path, "provider = \"from-file\"\ndebug_dir = \"out/debug\"\n").unwrap();
    env_mut::set_var(HarnessEnv::ConfigPath.as_str(), path.to_str().unwrap());
    env_mut::set_var(HarnessEnv::Provider.as_str(), "from-env");

    let config = HarnessConfig::load().expect("config should load");
    assert_eq!(config.provider, "from-env");
    assert_eq!(config.debug_dir, PathBuf::from("out/debug"));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let _lock = env_lock();
    let _guard = EnvGuard::clean();

    env_mut::set_var(HarnessEnv::ConfigPath.as_str(), "/nonexistent/harness.toml");
    let err = HarnessConfig::load().unwrap_err();
    assert!(err.to_string().starts_with("config io error"));
}
