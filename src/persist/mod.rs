//! Durable persistence of a whitelisted slice of store state.
//!
//! A [`Persistor`] listens to a store, stages the whitelisted fields as JSON
//! on every change and its writer task saves them to a [`Storage`] backend.
//! On startup it rehydrates those fields back into the store. [`PersistGate`]
//! keeps the real tree off screen until that has happened.

mod config;
mod gate;
mod persistor;
mod storage;

pub use config::{PersistConfig, DEFAULT_KEY, DEFAULT_KEY_PREFIX};
pub use gate::{PersistGate, DEFAULT_LOADING};
pub use persistor::{PersistStatus, Persistor};
pub use storage::{MemoryStorage, NoopStorage, Storage, StorageFuture};
