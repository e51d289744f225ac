//! The unified Turnip facade.
//!
//! [`Turnip`] wires a [`TurnipConfig`] to a concrete store and exposes the
//! resulting [`Catalog`].

use crate::{config::TurnipConfig, Result};

use std::sync::Arc;
use turnip_registry::{Catalog, DocumentStore, Record, Storage};

use tracing::{info, warn};

/// Entry point to a configured protocol catalog.
///
/// # Example
///
/// ```rust
/// use turnip_core::{Turnip, TurnipConfig};
///
/// let mut config = TurnipConfig::default();
/// config.storage.temporary = true;
///
/// let turnip = Turnip::new(config).unwrap();
/// let dns = turnip.create_protocol("DNS", &["domain"]).unwrap();
/// assert_eq!(turnip.catalog().resolve("domain").unwrap().name(), dns.name());
/// ```
pub struct Turnip {
    /// Configuration.
    config: TurnipConfig,

    /// Concrete store, kept for flushing.
    storage: Storage,

    /// Catalog over `storage`.
    catalog: Catalog,
}

impl Turnip {
    /// Opens the configured store and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid
    /// - The protocol database cannot be opened
    pub fn new(config: TurnipConfig) -> Result<Self> {
        config.validate()?;

        let storage = if config.storage.temporary {
            Storage::temporary()?
        } else {
            Storage::open(&config.storage.db_path)?
        }
        .with_name_key(&config.schema.name_field);

        let store: Arc<dyn DocumentStore> = Arc::new(storage.clone());
        let catalog = Catalog::new(store, config.schema.clone()).with_thresholds(
            config.search.protocol_threshold,
            config.search.field_threshold,
        );

        info!(
            "Turnip opened {} with {} protocols",
            if config.storage.temporary {
                "temporary storage".to_string()
            } else {
                config.storage.db_path.display().to_string()
            },
            catalog.count()?
        );

        Ok(Self {
            config,
            storage,
            catalog,
        })
    }

    /// The protocol catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The underlying store.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The active configuration.
    pub fn config(&self) -> &TurnipConfig {
        &self.config
    }

    /// Creates and persists a protocol from its name and aliases.
    pub fn create_protocol(&self, name: &str, aliases: &[&str]) -> Result<Record> {
        let record = self.catalog.create(name, aliases)?;
        self.catalog.add(&record)?;
        Ok(record)
    }

    /// Collects every validation failure of the catalog.
    pub fn report(&self) -> Result<Vec<String>> {
        let report: Vec<String> = self.catalog.check()?.collect();
        if !report.is_empty() {
            warn!("{} protocols failed validation", report.len());
        }
        Ok(report)
    }

    /// Flushes pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.storage.flush()?;
        Ok(())
    }
}
