//! Application configuration.

use serde::{Deserialize, Serialize};

use crate::app::Theme;
use crate::error::Result;
use crate::persist::PersistConfig;

/// Top-level settings. Every section falls back to its defaults.
///
/// ```
/// use tallyclock::AppConfig;
///
/// let config = AppConfig::from_toml_str(
///     r##"
///     [persist]
///     key = "secondary"
///
///     [theme.colors]
///     primary = "#ff0000"
///     "##,
/// )
/// .unwrap();
/// assert_eq!(config.persist.storage_key(), "persist:secondary");
/// assert_eq!(config.theme.colors.primary, "#ff0000");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub persist: PersistConfig,
    pub theme: Theme,
}

impl AppConfig {
    /// Parse TOML configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
