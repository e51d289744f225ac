//! Error types for Turnip Core.

use thiserror::Error;

/// Core error type for turnip operations.
#[derive(Debug, Error)]
pub enum TurnipError {
    /// Configuration file could not be read.
    #[error("Cannot read configuration {path}: {source}")]
    ConfigIo {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for [`TurnipConfig`](crate::TurnipConfig).
    #[error("Cannot parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration values are inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog error passthrough.
    #[error(transparent)]
    Catalog(#[from] turnip_registry::CatalogError),
}
