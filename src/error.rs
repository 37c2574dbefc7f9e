//! Error types for persistence and configuration.

use thiserror::Error;

/// Errors raised outside the transition function.
///
/// Dispatch never fails. These only come from storage, encoding and config
/// parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The storage backend rejected a read, write or removal.
    #[error("storage backend failed: {0}")]
    Storage(String),

    /// State could not be encoded to or decoded from JSON.
    #[error("persisted state encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The stored entry exists but is not a JSON object.
    #[error("persisted entry `{key}` is not a JSON object")]
    NotAnObject { key: String },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
