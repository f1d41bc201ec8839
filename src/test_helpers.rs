//! Shared test utilities for serialising environment mutation.

use std::env;

use tokio::sync::{Mutex, MutexGuard};

/// Serialises tests that touch process environment variables.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    saved: Vec<(String, Option<std::ffi::OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        let guard = ENV_LOCK.lock().await;
        let saved = pairs
            .iter()
            .map(|&(key, value)| {
                let previous = env::var_os(key);
                // SAFETY: ENV_LOCK serialises every test that mutates the environment.
                unsafe { env::set_var(key, value) };
                (key.to_owned(), previous)
            })
            .collect();
        Self {
            saved,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: the guard still holds ENV_LOCK.
            unsafe {
                match previous {
                    Some(value) => env::set_var(&key, value),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}
