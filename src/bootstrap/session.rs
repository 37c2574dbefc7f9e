use super::{AppStore, StoreContext};
use crate::timer::PreloadedState;

/// Memoized store accessor for a render hook.
///
/// Calls [`StoreContext::initialize_store`] only when the preloaded state
/// differs from the one seen on the previous call, so re-rendering with the
/// same page props keeps the same store.
#[derive(Debug, Default)]
pub struct SessionStore {
    cached: Option<(Option<PreloadedState>, AppStore)>,
}

impl SessionStore {
    /// Accessor with nothing cached yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store for `preloaded`, reusing the cached one when the value is unchanged.
    pub fn get_or_create(
        &mut self,
        context: &mut StoreContext,
        preloaded: Option<&PreloadedState>,
    ) -> AppStore {
        if let Some((seen, store)) = &self.cached {
            if seen.as_ref() == preloaded {
                return store.clone();
            }
        }

        let store = context.initialize_store(preloaded);
        self.cached = Some((preloaded.copied(), store.clone()));
        store
    }
}
