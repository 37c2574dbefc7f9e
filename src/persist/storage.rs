use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use parking_lot::Mutex;

use crate::error::Result;

/// Object-safe boxed future returned by [`Storage`] methods.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// String key/value storage, shaped like a browser's local storage.
pub trait Storage: Send + Sync {
    /// Loads the raw value stored under `key`.
    fn get_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Result<Option<String>>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item<'a>(&'a self, key: &'a str, value: &'a str) -> StorageFuture<'a, Result<()>>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Result<()>>;
}

/// Storage that keeps nothing. Used where no durable medium exists, such as a
/// render-only pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn get_item<'a>(&'a self, _key: &'a str) -> StorageFuture<'a, Result<Option<String>>> {
        Box::pin(async { Ok(None) })
    }

    fn set_item<'a>(&'a self, _key: &'a str, _value: &'a str) -> StorageFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn remove_item<'a>(&'a self, _key: &'a str) -> StorageFuture<'a, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// In-memory storage. Clones share the same entries, so a test can keep a
/// handle after giving one to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Synchronous peek at an entry.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Result<Option<String>>> {
        Box::pin(async move { Ok(self.inner.lock().get(key).cloned()) })
    }

    fn set_item<'a>(&'a self, key: &'a str, value: &'a str) -> StorageFuture<'a, Result<()>> {
        Box::pin(async move {
            self.inner
                .lock()
                .insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Result<()>> {
        Box::pin(async move {
            self.inner.lock().remove(key);
            Ok(())
        })
    }
}
