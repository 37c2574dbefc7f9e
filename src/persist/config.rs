use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_KEY: &str = "primary";
pub const DEFAULT_KEY_PREFIX: &str = "persist:";

/// Which state fields are persisted, and under which storage key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Namespace identifier for the stored entry.
    pub key: String,
    pub key_prefix: String,
    /// Top-level state fields (wire names) that are written to storage.
    pub whitelist: Vec<String>,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            whitelist: vec!["count".to_string()],
        }
    }
}

impl PersistConfig {
    /// Full storage key, e.g. `persist:primary`.
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.key_prefix, self.key)
    }

    /// Whether `field` is on the whitelist.
    pub fn allows(&self, field: &str) -> bool {
        self.whitelist.iter().any(|allowed| allowed == field)
    }

    /// Keep only whitelisted fields.
    pub fn select(&self, fields: &Map<String, Value>) -> Map<String, Value> {
        fields
            .iter()
            .filter(|(field, _)| self.allows(field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}
