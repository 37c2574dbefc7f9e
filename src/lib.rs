//! # Tallyclock
//!
//! A counter and clock state container for page-rendering hosts.
//!
//! ## State
//!
//! - [`TimerState`] - the counter, the last clock tick and where it came from
//! - [`TimerAction`] - tick, increment, decrement and reset
//! - [`transition`] - the pure, total transition function
//!
//! ## Store
//!
//! - [`Store`] - reducer-driven container with `dispatch` and `subscribe`
//! - [`Persistor`] - persists a whitelisted slice of state and rehydrates it
//! - [`PersistGate`] - placeholder until rehydration finishes
//!
//! ## Bootstrap
//!
//! - [`StoreContext`] - one live store per interactive session, a fresh one per render pass
//! - [`SessionStore`] - memoized accessor keyed by the page's preloaded state
//! - [`App`] - the page shell tying it together

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod persist;
pub mod store;
pub mod timer;

// Re-export main types for convenience
pub use app::{App, PageProps, RenderScope, Theme};
pub use bootstrap::{AppStore, ExecutionMode, SessionStore, StoreContext, TimerStore};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use persist::{MemoryStorage, NoopStorage, PersistConfig, PersistGate, Persistor, Storage};
pub use store::{Store, Subscription};
pub use timer::{
    client_tick, decrement, increment, reset, server_tick, tick_at, transition, transition_raw,
    PreloadedState, RawAction, TimerAction, TimerState,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::new(timer::reduce, TimerState::initial());
        assert_eq!(store.get_state().count, 0);
        store.dispatch(increment());
        assert_eq!(store.get_state().count, 1);
    }
}
