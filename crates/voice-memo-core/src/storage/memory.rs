use crate::{CoreResult, MemoError, storage::KeyValueStore};

use std::{
    collections::HashMap,
    panic::Location,
    sync::atomic::{AtomicBool, Ordering},
};

use error_location::ErrorLocation;
use tokio::sync::Mutex;
use tracing::debug;

/// In-process key-value store.
///
/// Nothing survives the process. Writes can be switched to fail, which is
/// how callers exercise their persistence-failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `value` under `key`.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value.into());
        Self {
            values: Mutex::new(values),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes every following `set` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> CoreResult<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(MemoError::Storage {
                reason: format!("Write to '{key}' rejected"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!(key, bytes = value.len(), "Value stored in memory");
        self.values.lock().await.insert(key.to_string(), value);

        Ok(())
    }
}
