use std::future::Future;
use std::sync::Arc;

use futures::channel::mpsc::{self, Sender};
use futures::StreamExt;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{PersistConfig, Storage};
use crate::error::{Error, Result};
use crate::store::Store;

/// Lifecycle flags of a [`Persistor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistStatus {
    /// Stored fields have been merged into the store (or the attempt gave up).
    pub rehydrated: bool,
    /// The UI may render the real tree.
    pub bootstrapped: bool,
    /// State changes are not being staged for writing.
    pub paused: bool,
}

struct Inner {
    config: PersistConfig,
    storage_key: String,
    storage: Arc<dyn Storage>,
    status: Mutex<PersistStatus>,
    staged: Mutex<Option<String>>,
    written: Mutex<Option<String>>,
    wake_writer: Mutex<Option<Sender<()>>>,
}

/// Keeps the whitelisted part of a store's state in durable storage.
///
/// Every committed state is encoded and staged. The task returned by
/// [`Persistor::writer`] writes each staged entry as it arrives, and
/// [`Persistor::flush`] drains it by hand. Nothing is staged before
/// rehydration finishes, so a fresh store's defaults never overwrite what
/// is already stored.
#[derive(Clone)]
pub struct Persistor {
    inner: Arc<Inner>,
}

impl Persistor {
    /// Attach a persistor to `store`.
    ///
    /// The listener stays registered for the life of the store. Rehydration
    /// does not start until the future from [`Persistor::rehydrate`] is
    /// polled.
    pub fn attach<S, A>(
        store: &Store<S, A>,
        config: PersistConfig,
        storage: Arc<dyn Storage>,
    ) -> Self
    where
        S: Serialize + Clone + Send + Sync + 'static,
        A: 'static,
    {
        let persistor = Self {
            inner: Arc::new(Inner {
                storage_key: config.storage_key(),
                config,
                storage,
                status: Mutex::new(PersistStatus::default()),
                staged: Mutex::new(None),
                written: Mutex::new(None),
                wake_writer: Mutex::new(None),
            }),
        };

        let listener = persistor.clone();
        store.subscribe(move |state| listener.stage(state)).detach();
        persistor
    }

    /// Snapshot of the lifecycle flags.
    pub fn status(&self) -> PersistStatus {
        *self.inner.status.lock()
    }

    /// Whether the loading gate may open.
    pub fn is_bootstrapped(&self) -> bool {
        self.inner.status.lock().bootstrapped
    }

    /// Full key of the storage entry, prefix included.
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// Stop staging writes.
    pub fn pause(&self) {
        self.inner.status.lock().paused = true;
    }

    /// Resume staging writes after [`Persistor::pause`].
    pub fn persist(&self) {
        self.inner.status.lock().paused = false;
    }

    /// Stop persisting for good.
    ///
    /// Pauses, drops any staged write and ends the writer task. Used when
    /// the store is replaced and another persistor owns the entry.
    pub fn retire(&self) {
        self.pause();
        self.inner.staged.lock().take();
        self.inner.wake_writer.lock().take();
    }

    /// Task that writes staged entries to storage as they are staged.
    ///
    /// Spawn it next to the rehydration future. Calling this again replaces
    /// the previous writer, which then finishes.
    pub fn writer(&self) -> impl Future<Output = ()> + 'static {
        let (wake, mut staged) = mpsc::channel(0);
        *self.inner.wake_writer.lock() = Some(wake);
        if self.has_pending_write() {
            self.wake_writer();
        }

        let persistor = self.clone();
        async move {
            while staged.next().await.is_some() {
                // A failed write is logged by flush and stays staged.
                let _ = persistor.flush().await;
            }
            debug!(key = %persistor.storage_key(), "storage writer stopped");
        }
    }

    /// Whether a staged entry is waiting for [`Persistor::flush`].
    pub fn has_pending_write(&self) -> bool {
        self.inner.staged.lock().is_some()
    }

    /// Load stored fields and merge them into `store`.
    ///
    /// Failures are logged and the store keeps its in-memory state. Either
    /// way the persistor ends up bootstrapped.
    pub fn rehydrate<S, A>(&self, store: Store<S, A>) -> impl Future<Output = ()> + 'static
    where
        S: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        A: 'static,
    {
        let persistor = self.clone();
        async move {
            let loaded = persistor.load().await;
            persistor.mark_rehydrated();

            let current = store.get_state();
            let merged = loaded.and_then(|stored| match stored {
                Some(stored) => merge_stored(&current, &stored, &persistor.inner.config).map(Some),
                None => Ok(None),
            });

            match merged {
                Ok(Some(next)) => {
                    debug!(key = %persistor.storage_key(), "rehydrated persisted state");
                    store.replace_state(next);
                }
                Ok(None) => {
                    debug!(key = %persistor.storage_key(), "nothing persisted yet");
                    persistor.stage(&current);
                }
                Err(err) => {
                    warn!(key = %persistor.storage_key(), %err, "rehydration failed; keeping in-memory state");
                    persistor.stage(&current);
                }
            }
        }
    }

    /// Give up on rehydration and open the gate with in-memory state.
    pub fn skip_rehydration(&self) {
        self.mark_rehydrated();
    }

    /// Write the latest staged entry, if any.
    ///
    /// A failed write stays staged so the next flush retries it, unless a
    /// newer state was staged in the meantime.
    pub async fn flush(&self) -> Result<()> {
        let Some(raw) = self.inner.staged.lock().take() else {
            return Ok(());
        };
        if self.inner.written.lock().as_deref() == Some(raw.as_str()) {
            return Ok(());
        }

        match self.inner.storage.set_item(&self.inner.storage_key, &raw).await {
            Ok(()) => {
                debug!(key = %self.storage_key(), "flushed persisted state");
                *self.inner.written.lock() = Some(raw);
                Ok(())
            }
            Err(err) => {
                warn!(key = %self.storage_key(), %err, "persisting state failed");
                self.inner.staged.lock().get_or_insert(raw);
                Err(err)
            }
        }
    }

    /// Remove the stored entry and drop any staged write.
    pub async fn purge(&self) -> Result<()> {
        self.inner.staged.lock().take();
        self.inner.written.lock().take();
        self.inner.storage.remove_item(&self.inner.storage_key).await?;
        debug!(key = %self.storage_key(), "purged persisted state");
        Ok(())
    }

    fn mark_rehydrated(&self) {
        let mut status = self.inner.status.lock();
        status.rehydrated = true;
        status.bootstrapped = true;
    }

    fn stage<S: Serialize>(&self, state: &S) {
        let status = self.status();
        if !status.rehydrated || status.paused {
            return;
        }
        match encode_whitelisted(state, &self.inner.config) {
            Ok(raw) => {
                *self.inner.staged.lock() = Some(raw);
                self.wake_writer();
            }
            Err(err) => warn!(key = %self.storage_key(), %err, "could not encode state for storage"),
        }
    }

    fn wake_writer(&self) {
        if let Some(wake) = self.inner.wake_writer.lock().as_mut() {
            // Full means a wake-up is already pending. Closed means the
            // writer is gone and only flush writes.
            let _ = wake.try_send(());
        }
    }

    async fn load(&self) -> Result<Option<Map<String, Value>>> {
        let Some(raw) = self.inner.storage.get_item(&self.inner.storage_key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(fields) => Ok(Some(fields)),
            _ => Err(Error::NotAnObject {
                key: self.inner.storage_key.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for Persistor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistor")
            .field("key", &self.inner.storage_key)
            .field("status", &self.status())
            .finish()
    }
}

fn state_fields<S: Serialize>(state: &S, key: &str) -> Result<Map<String, Value>> {
    match serde_json::to_value(state)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(Error::NotAnObject {
            key: key.to_string(),
        }),
    }
}

fn encode_whitelisted<S: Serialize>(state: &S, config: &PersistConfig) -> Result<String> {
    let fields = state_fields(state, &config.storage_key())?;
    Ok(serde_json::to_string(&config.select(&fields))?)
}

// Whitelisted stored fields replace current ones; everything else is kept.
fn merge_stored<S>(current: &S, stored: &Map<String, Value>, config: &PersistConfig) -> Result<S>
where
    S: Serialize + DeserializeOwned,
{
    let mut fields = state_fields(current, &config.storage_key())?;
    fields.extend(config.select(stored));
    Ok(serde_json::from_value(Value::Object(fields))?)
}
