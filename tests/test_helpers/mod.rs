//! Scoped process-environment overrides for integration tests.

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Restores overridden variables on drop. Holds a global lock so that only
/// one test mutates the environment at a time.
pub struct EnvVarGuard {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Applies `overrides`; `None` removes the variable.
    #[must_use]
    pub fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let saved = overrides
            .iter()
            .map(|&(key, value)| {
                let previous = env::var(key).ok();
                // SAFETY: ENV_MUTEX serializes every environment mutation in tests.
                unsafe { write_var(key, value) };
                (key.to_owned(), previous)
            })
            .collect();

        Self {
            saved,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: the guard still holds ENV_MUTEX.
            unsafe { write_var(&key, previous.as_deref()) };
        }
    }
}

unsafe fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold ENV_MUTEX.
    unsafe {
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}
