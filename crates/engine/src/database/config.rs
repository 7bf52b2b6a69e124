//! Database configuration via `kvmodel.toml`
//!
//! The model keeps no data on disk; the config file only seeds the oracle
//! and sets transaction defaults. Missing fields fall back to defaults, so an
//! empty file is a valid config.

use kvmodel_core::{Error, Result, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "kvmodel.toml";

/// Database configuration loaded from `kvmodel.toml`.
///
/// # Example
///
/// ```toml
/// # First timestamp handed out by the oracle
/// initial_timestamp = 1
/// # First transaction id handed out by the oracle
/// initial_txn_id = 1
/// # Roll back transactions dropped while still active
/// rollback_on_drop = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// First timestamp handed out by the oracle. Must be at least 1.
    #[serde(default = "default_initial")]
    pub initial_timestamp: u64,
    /// First transaction id handed out by the oracle. Must be at least 1.
    #[serde(default = "default_initial")]
    pub initial_txn_id: u64,
    /// Roll back transactions that are dropped while still active.
    #[serde(default = "default_rollback_on_drop")]
    pub rollback_on_drop: bool,
}

fn default_initial() -> u64 {
    1
}

fn default_rollback_on_drop() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            initial_timestamp: default_initial(),
            initial_txn_id: default_initial(),
            rollback_on_drop: default_rollback_on_drop(),
        }
    }
}

impl DatabaseConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// `Error::Config` if a starting value is 0 (reserved for `NONE`) or the
    /// initial timestamp collides with the `LATEST` sentinel.
    pub fn validate(&self) -> Result<()> {
        if self.initial_timestamp == 0 {
            return Err(Error::Config(
                "initial_timestamp must be at least 1".to_string(),
            ));
        }
        if Timestamp::new(self.initial_timestamp).is_latest() {
            return Err(Error::Config(
                "initial_timestamp must be below the LATEST sentinel".to_string(),
            ));
        }
        if self.initial_txn_id == 0 {
            return Err(Error::Config("initial_txn_id must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DatabaseConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
