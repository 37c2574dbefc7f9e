use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

type Reducer<S, A> = Arc<dyn Fn(&S, &A) -> S + Send + Sync>;
type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;
type ListenerList<S> = Mutex<Vec<(usize, Listener<S>)>>;

/// A reducer-driven state container.
///
/// State only changes through [`Store::dispatch`], which runs the reducer
/// against the committed state and swaps in the value it returns. Handles
/// are cheap to clone and share the same state and listener list.
pub struct Store<S, A> {
    state: Arc<RwLock<S>>,
    reducer: Reducer<S, A>,
    listeners: Arc<ListenerList<S>>,
    next_listener: Arc<AtomicUsize>,
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: 'static,
{
    /// Create a store from a reducer and its starting state.
    pub fn new<R>(reducer: R, initial: S) -> Self
    where
        R: Fn(&S, &A) -> S + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(RwLock::new(initial)),
            reducer: Arc::new(reducer),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get a clone of the current state.
    pub fn get_state(&self) -> S {
        self.state.read().clone()
    }

    /// Run an action through the reducer and notify listeners.
    ///
    /// The write lock is held for the whole reduction, so two dispatches
    /// never interleave. Listeners run after the lock is released and may
    /// dispatch again.
    pub fn dispatch(&self, action: A) {
        let next = {
            let mut state = self.state.write();
            let next = (self.reducer)(&*state, &action);
            *state = next.clone();
            next
        };
        self.notify(&next);
    }

    /// Replace the whole state without running the reducer.
    pub fn replace_state(&self, next: S) {
        *self.state.write() = next.clone();
        self.notify(&next);
    }

    /// Subscribe to state changes.
    ///
    /// The listener is called with the new state after every dispatch or
    /// replacement, until the returned [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().push((id, Arc::new(listener)));

        let weak: Weak<ListenerList<S>> = Arc::downgrade(&self.listeners);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.lock().retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Read state without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = self.state.read();
        f(&*state)
    }

    /// Whether two handles point at the same underlying store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn notify(&self, state: &S) {
        // Snapshot so listeners can subscribe or unsubscribe while we iterate.
        let listeners: Vec<Listener<S>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            listeners: Arc::clone(&self.listeners),
            next_listener: Arc::clone(&self.next_listener),
        }
    }
}

impl<S: std::fmt::Debug, A> std::fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.state.read())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

/// RAII guard for a store listener.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the listener registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
