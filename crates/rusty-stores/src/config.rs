// File: rusty-stores/src/config.rs
// Purpose: Configuration parsing from rusty-stores.toml

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::location::LocationContext;
use crate::storage::{persisted, Persisted, StorageArea, StorageAreas};
use crate::StoreError;

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoresConfig {
    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Initial location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Absolute href the location context starts at (default: "http://localhost/")
    #[serde(default = "default_href")]
    pub href: String,
}

/// Persisted store settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Prepended to every storage key (default: none)
    #[serde(default)]
    pub key_prefix: String,

    /// Storage area for persisted stores (default: local)
    #[serde(default)]
    pub area: StorageArea,
}

// Default values
fn default_href() -> String {
    "http://localhost/".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            href: default_href(),
        }
    }
}

impl StoresConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: StoresConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        tracing::debug!("Loaded store config from {:?}", path);
        Ok(config)
    }

    /// Load configuration from default path (./rusty-stores.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("rusty-stores.toml")
    }

    /// A location context at the configured href
    pub fn location_context(&self) -> Result<LocationContext, StoreError> {
        LocationContext::new(&self.location.href)
    }

    /// The storage key for `key`, with the configured prefix
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.storage.key_prefix, key)
    }

    /// A persisted store in the configured area under the prefixed key
    pub fn persisted<T>(&self, areas: &StorageAreas, key: &str, initial: T) -> Persisted<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        persisted(areas.area(self.storage.area), self.storage_key(key), initial)
    }
}
