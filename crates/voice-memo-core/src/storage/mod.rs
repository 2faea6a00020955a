mod file;
mod memory;

pub use {file::FileStore, memory::MemoryStore};

use crate::CoreResult;

use std::future::Future;

/// Persistent string key-value store.
pub trait KeyValueStore {
    /// Reads the value under `key`. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> impl Future<Output = CoreResult<Option<String>>>;

    /// Replaces the value under `key`.
    fn set(&self, key: &str, value: String) -> impl Future<Output = CoreResult<()>>;
}

impl<S: KeyValueStore> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = CoreResult<Option<String>>> {
        S::get(self, key)
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = CoreResult<()>> {
        S::set(self, key, value)
    }
}
