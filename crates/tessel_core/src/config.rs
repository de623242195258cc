//! # Manager Configuration
//!
//! Tuning knobs for a [`Manager`](crate::Manager), loaded once at startup.
//!
//! ```toml
//! entity_capacity = 4096
//! store_capacity = 256
//! log_ticks = false
//! ```
//!
//! The maximum number of component kinds is deliberately NOT here: it sizes
//! the per-entity bitset and is the compile-time constant
//! [`MAX_KINDS`](crate::MAX_KINDS).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Upper bound accepted for either capacity hint.
const CAPACITY_LIMIT: usize = 1 << 28;

/// Configuration for a [`Manager`](crate::Manager).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// Initial capacity of the entity table.
    pub entity_capacity: usize,
    /// Capacity reserved by each lazily created component store.
    pub store_capacity: usize,
    /// Emit a debug event with the duration of every tick.
    pub log_ticks: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 1024,
            store_capacity: 64,
            log_ticks: false,
        }
    }
}

impl ManagerConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys fall back to [`ManagerConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML,
    /// names an unknown key, or fails [`ManagerConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or its
    /// contents are rejected by [`ManagerConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks that both capacity hints are within range.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> EcsResult<()> {
        if self.entity_capacity > CAPACITY_LIMIT {
            return Err(EcsError::InvalidConfig(format!(
                "entity_capacity {} exceeds {CAPACITY_LIMIT}",
                self.entity_capacity
            )));
        }
        if self.store_capacity > CAPACITY_LIMIT {
            return Err(EcsError::InvalidConfig(format!(
                "store_capacity {} exceeds {CAPACITY_LIMIT}",
                self.store_capacity
            )));
        }
        Ok(())
    }
}
