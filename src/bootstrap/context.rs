use std::sync::Arc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use tracing::{debug, warn};

use crate::persist::{PersistConfig, Persistor, Storage};
use crate::store::{Store, Subscription};
use crate::timer::{reduce, PreloadedState, TimerAction, TimerState};

/// Store specialised to the counter and clock state.
pub type TimerStore = Store<TimerState, TimerAction>;

/// Where a bootstrap call runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One-shot render pass. Every call gets its own store.
    RenderOnly,
    /// Long-lived session. The store is kept and reused across renders.
    Interactive,
}

/// A store together with the persistor attached to it.
#[derive(Clone, Debug)]
pub struct AppStore {
    store: TimerStore,
    persistor: Persistor,
}

impl AppStore {
    /// The underlying reducer store.
    pub fn store(&self) -> &TimerStore {
        &self.store
    }

    /// The persistor writing this store's whitelisted fields.
    pub fn persistor(&self) -> &Persistor {
        &self.persistor
    }

    /// Snapshot of the current state.
    pub fn get_state(&self) -> TimerState {
        self.store.get_state()
    }

    /// Run `action` through the transition function and notify listeners.
    pub fn dispatch(&self, action: TimerAction) {
        self.store.dispatch(action);
    }

    /// Register a listener called after every committed state.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TimerState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Whether both handles share one underlying store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.store.ptr_eq(&other.store)
    }
}

/// Bootstrap state for one runtime context.
///
/// Holds at most one live store. In [`ExecutionMode::RenderOnly`] the slot
/// is never filled, so concurrent render passes never share state.
pub struct StoreContext {
    mode: ExecutionMode,
    current: Option<AppStore>,
    storage: Arc<dyn Storage>,
    config: PersistConfig,
    spawner: Box<dyn LocalSpawn>,
}

impl StoreContext {
    /// Create a context. Rehydration tasks are spawned on `spawner`.
    pub fn new<Sp>(mode: ExecutionMode, storage: Arc<dyn Storage>, spawner: Sp) -> Self
    where
        Sp: LocalSpawn + 'static,
    {
        Self {
            mode,
            current: None,
            storage,
            config: PersistConfig::default(),
            spawner: Box::new(spawner),
        }
    }

    /// Use `config` for stores created from now on.
    pub fn with_config(mut self, config: PersistConfig) -> Self {
        self.config = config;
        self
    }

    /// Where this context runs.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The live session store, if one has been created.
    pub fn current(&self) -> Option<&AppStore> {
        self.current.as_ref()
    }

    /// Get the store for this render.
    ///
    /// - No live store: build one seeded by `preloaded` over the defaults.
    /// - Live store and `preloaded`: build a new one seeded by the live
    ///   state with `preloaded` merged on top, and retire the old one's
    ///   persistor. Once rehydrated, stored fields win over the merge.
    /// - Live store, no `preloaded`: reuse it.
    ///
    /// Only an interactive context remembers the result.
    pub fn initialize_store(&mut self, preloaded: Option<&PreloadedState>) -> AppStore {
        let store = match (self.current.take(), preloaded) {
            (Some(existing), Some(preloaded)) => {
                let seed = existing.get_state().merged(preloaded);
                debug!(?seed, "merging preloaded state into session store");
                existing.persistor().retire();
                self.init_store(seed)
            }
            (Some(existing), None) => existing,
            (None, preloaded) => {
                let seed = preloaded
                    .map(|preloaded| TimerState::initial().merged(preloaded))
                    .unwrap_or_else(TimerState::initial);
                self.init_store(seed)
            }
        };

        if self.mode == ExecutionMode::Interactive {
            self.current = Some(store.clone());
        }
        store
    }

    fn init_store(&self, seed: TimerState) -> AppStore {
        let store = Store::new(reduce, seed);
        let persistor = Persistor::attach(&store, self.config.clone(), Arc::clone(&self.storage));

        if let Err(err) = self.spawner.spawn_local(persistor.rehydrate(store.clone())) {
            warn!(%err, "could not schedule rehydration; continuing with in-memory state");
            persistor.skip_rehydration();
        }
        if let Err(err) = self.spawner.spawn_local(persistor.writer()) {
            warn!(%err, "could not schedule the storage writer; state persists only on flush");
        }

        debug!(mode = ?self.mode, key = %persistor.storage_key(), "store created");
        AppStore { store, persistor }
    }
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
