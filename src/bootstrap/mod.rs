//! Store construction and reuse across render passes.
//!
//! A [`StoreContext`] replaces a process-wide store variable. Callers thread
//! it through each render, and it decides whether to build a new store,
//! merge page state into a fresh one, or reuse the live session store.

mod context;
mod session;

pub use context::{AppStore, ExecutionMode, StoreContext, TimerStore};
pub use session::SessionStore;
