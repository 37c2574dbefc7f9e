//! Reducer-driven state containers.
//!
//! A [`Store`] owns a state value and a transition function. All changes go
//! through `dispatch`, and listeners observe every committed state.

mod store;

pub use store::{Store, Subscription};
