//! Application configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Name of the backend used when the configuration does not pick one.
pub const DEFAULT_STORE_BACKEND: &str = "memory";

/// Application configuration, shared by every request.
///
/// # Examples
///
/// ```
/// use tiddlyweb_utils::Config;
///
/// let config = Config::from_json(
///     r#"{"server_store": ["memory", {}], "system_plugins": ["tiddlywebwiki"]}"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.server_store.backend, "memory");
/// assert!(config.extra.contains_key("system_plugins"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Which store backend to open, and its options
    #[serde(default)]
    pub server_store: StoreConfig,
    /// Every other setting, kept for plugins to read
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// Parses a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns a setting outside the ones this type names.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// The `server_store` setting.
///
/// Accepts both the `["backend", {options}]` pair and the
/// `{"backend": ..., "options": ...}` table form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoreConfigRepr")]
pub struct StoreConfig {
    /// Registered backend name
    pub backend: String,
    /// Backend-specific options
    pub options: Map<String, Value>,
}

impl StoreConfig {
    /// Creates a store setting with no options.
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            options: Map::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_BACKEND)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoreConfigRepr {
    Pair(String, Map<String, Value>),
    Table {
        backend: String,
        #[serde(default)]
        options: Map<String, Value>,
    },
}

impl From<StoreConfigRepr> for StoreConfig {
    fn from(repr: StoreConfigRepr) -> Self {
        match repr {
            StoreConfigRepr::Pair(backend, options) => Self { backend, options },
            StoreConfigRepr::Table { backend, options } => Self { backend, options },
        }
    }
}
