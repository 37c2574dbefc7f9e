use super::Persistor;

/// Placeholder shown while rehydration is in flight.
pub const DEFAULT_LOADING: &str = "<div>loading</div>";

/// Holds back a render until its persistor has bootstrapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistGate {
    loading: String,
}

impl Default for PersistGate {
    fn default() -> Self {
        Self::new(DEFAULT_LOADING)
    }
}

impl PersistGate {
    /// Gate that shows `loading` until the persistor bootstraps.
    pub fn new(loading: impl Into<String>) -> Self {
        Self {
            loading: loading.into(),
        }
    }

    /// The placeholder markup.
    pub fn loading(&self) -> &str {
        &self.loading
    }

    /// Render the placeholder, or the real tree once `persistor` is bootstrapped.
    pub fn render<F>(&self, persistor: &Persistor, children: F) -> String
    where
        F: FnOnce() -> String,
    {
        if persistor.is_bootstrapped() {
            children()
        } else {
            self.loading.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::executor::block_on;

    use super::*;
    use crate::persist::{NoopStorage, PersistConfig};
    use crate::store::Store;
    use crate::timer::{reduce, TimerState};

    #[test]
    fn gate_opens_after_rehydration() {
        let store = Store::new(reduce, TimerState::initial());
        let persistor = Persistor::attach(&store, PersistConfig::default(), Arc::new(NoopStorage));
        let gate = PersistGate::default();

        assert_eq!(gate.render(&persistor, || "page".to_string()), "<div>loading</div>");

        block_on(persistor.rehydrate(store));
        assert_eq!(gate.render(&persistor, || "page".to_string()), "page");
    }

    #[test]
    fn custom_placeholder() {
        let store = Store::new(reduce, TimerState::initial());
        let persistor = Persistor::attach(&store, PersistConfig::default(), Arc::new(NoopStorage));
        let gate = PersistGate::new("<p>wait</p>");
        assert_eq!(gate.render(&persistor, String::new), "<p>wait</p>");
    }
}
