//! Configuration types for Turnip.

use crate::{error::TurnipError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use turnip_registry::catalog::DEFAULT_PROTOCOL_THRESHOLD;
use turnip_registry::Schema;

/// Configuration for the Turnip facade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnipConfig {
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Name and field resolution settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Protocol field layout.
    #[serde(default)]
    pub schema: Schema,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the protocol database.
    pub db_path: PathBuf,

    /// Use a throwaway in-memory database instead of `db_path`.
    #[serde(default)]
    pub temporary: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./turnip_protocols.db"),
            temporary: false,
        }
    }
}

/// Resolution fuzziness, both in `[0, 1]`.
///
/// `0.0` means exact-or-contains matching only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Threshold for protocol names and aliases.
    pub protocol_threshold: f64,

    /// Threshold for field names inside a protocol.
    pub field_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            protocol_threshold: DEFAULT_PROTOCOL_THRESHOLD,
            field_threshold: 0.0,
        }
    }
}

impl TurnipConfig {
    /// Reads a JSON configuration file and validates it.
    ///
    /// Sections missing from the file take their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TurnipError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;

        let config: TurnipConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("protocol_threshold", self.search.protocol_threshold),
            ("field_threshold", self.search.field_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TurnipError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    label, value
                )));
            }
        }

        let schema = &self.schema;
        if !schema.mandatory().any(|f| f == schema.name_field) {
            return Err(TurnipError::Config(format!(
                "name field '{}' must be declared mandatory",
                schema.name_field
            )));
        }
        if schema.field(&schema.alias_field).is_none() {
            return Err(TurnipError::Config(format!(
                "alias field '{}' is not declared",
                schema.alias_field
            )));
        }

        Ok(())
    }
}
