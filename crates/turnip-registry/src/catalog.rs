//! # Protocol Catalog - Main Facade
//!
//! The [`Catalog`] owns existence and uniqueness semantics across every
//! protocol in the store, and fans validation out to each record.
//!
//! ## Consistency Model
//!
//! Nothing is cached. Every resolution or listing call re-reads the whole
//! collection from the store, so a lookup always observes the latest write,
//! including writes made by other processes sharing the database. Each
//! lookup costs a full scan; the catalog is expected to stay small and
//! rarely written.
//!
//! ## Resolution
//!
//! ```text
//!   query ──▶ for each stored protocol (name + aliases):
//!               exact (case-insensitive) hit ──▶ return it immediately
//!               fuzzy hit                     ──▶ remember it
//!             after the scan:
//!               1 remembered  ──▶ return it
//!               2+ remembered ──▶ AmbiguousMatch
//!               0 remembered  ──▶ UnknownProtocol
//! ```

use crate::models::{CatalogError, Document, FieldValue, Result};
use crate::record::Record;
use crate::schema::Schema;
use crate::search::{exact_search, search};
use crate::storage::DocumentStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default fuzziness for protocol name resolution.
pub const DEFAULT_PROTOCOL_THRESHOLD: f64 = 0.85;

/// The collection of protocol records.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use turnip_registry::{Catalog, Schema, Storage};
///
/// let catalog = Catalog::new(Arc::new(Storage::temporary().unwrap()), Schema::default());
///
/// let http = catalog.create("HTTP", &["http2"]).unwrap();
/// catalog.add(&http).unwrap();
///
/// let found = catalog.resolve("HTTP2").unwrap();
/// assert_eq!(found.name(), "HTTP");
/// assert_eq!(catalog.count().unwrap(), 1);
/// ```
#[derive(Clone)]
pub struct Catalog {
    /// Backing document store.
    store: Arc<dyn DocumentStore>,

    /// Field layout handed to every record.
    schema: Arc<Schema>,

    /// Fuzziness for protocol name resolution.
    protocol_threshold: f64,

    /// Fuzziness for field resolution inside records.
    field_threshold: f64,
}

impl Catalog {
    /// Creates a catalog over `store` with default thresholds.
    pub fn new(store: Arc<dyn DocumentStore>, schema: Schema) -> Self {
        Self {
            store,
            schema: Arc::new(schema),
            protocol_threshold: DEFAULT_PROTOCOL_THRESHOLD,
            field_threshold: 0.0,
        }
    }

    /// Overrides the fuzziness thresholds.
    pub fn with_thresholds(mut self, protocol_threshold: f64, field_threshold: f64) -> Self {
        self.protocol_threshold = protocol_threshold;
        self.field_threshold = field_threshold;
        self
    }

    /// The schema shared by all records of this catalog.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Builds a new, unsaved record from arbitrary fields.
    ///
    /// Mandatory fields are filled and the result validated.
    pub fn create_record(&self, fields: Document) -> Result<Record> {
        Record::create(self.schema.clone(), self.store.clone(), fields)
            .map(|record| record.with_field_threshold(self.field_threshold))
    }

    /// Builds a new, unsaved record from a name and aliases.
    pub fn create(&self, name: &str, aliases: &[&str]) -> Result<Record> {
        let mut fields = Document::new();
        fields.insert(self.schema.name_field.clone(), FieldValue::from(name));
        fields.insert(
            self.schema.alias_field.clone(),
            FieldValue::List(aliases.iter().map(|a| a.to_string()).collect()),
        );
        self.create_record(fields)
    }

    /// Finds a protocol by name or alias, ignoring case.
    ///
    /// An exact hit wins over any number of fuzzy hits.
    ///
    /// # Errors
    ///
    /// - `CatalogError::UnknownProtocol` if nothing matches.
    /// - `CatalogError::AmbiguousMatch` listing the canonical names of every
    ///   fuzzy hit when there are several.
    pub fn resolve(&self, name: &str) -> Result<Record> {
        let mut matches = Vec::new();

        for record in self.records()? {
            let names = record.names();
            if exact_search(name, &names).is_some() {
                debug!("Protocol '{}' resolved exactly to '{}'", name, record.name());
                return Ok(record);
            }
            if !search(name, &names, self.protocol_threshold).is_empty() {
                matches.push(record);
            }
        }

        match matches.len() {
            1 => {
                let record = matches.remove(0);
                debug!("Protocol '{}' resolved to '{}'", name, record.name());
                Ok(record)
            }
            0 => Err(CatalogError::UnknownProtocol(name.to_string())),
            _ => Err(CatalogError::AmbiguousMatch {
                candidates: matches.iter().map(|r| r.name().to_string()).collect(),
            }),
        }
    }

    /// Persists a new protocol.
    ///
    /// # Errors
    ///
    /// `CatalogError::AlreadyExists` if the record's name already resolves.
    /// Resolution errors other than `UnknownProtocol` propagate unchanged.
    pub fn add(&self, record: &Record) -> Result<()> {
        match self.resolve(record.name()) {
            Ok(existing) => return Err(CatalogError::AlreadyExists(existing.name().to_string())),
            Err(CatalogError::UnknownProtocol(_)) => {}
            Err(e) => return Err(e),
        }

        self.store.insert_one(&record.to_dict(true))?;
        info!("Added protocol: {}", record.name());
        Ok(())
    }

    /// Deletes an existing protocol.
    ///
    /// Existence is confirmed through [`resolve`](Self::resolve) first; the
    /// store is not touched when that fails.
    ///
    /// # Errors
    ///
    /// `CatalogError::UnknownProtocol` if the name does not resolve, or if it
    /// only resolved to another protocol and nothing is stored under it.
    pub fn delete(&self, record: &Record) -> Result<()> {
        self.resolve(record.name())?;
        if !self.store.delete_one(record.name())? {
            return Err(CatalogError::UnknownProtocol(record.name().to_string()));
        }
        info!("Deleted protocol: {}", record.name());
        Ok(())
    }

    /// Validates every protocol.
    ///
    /// Yields one message per record failing [`Record::check`], in
    /// case-insensitive name order. Failures never abort the scan.
    pub fn check(&self) -> Result<impl Iterator<Item = String>> {
        Ok(self.all_as_records()?.into_iter().filter_map(|record| {
            record.check().err().map(|e| {
                warn!("Protocol '{}' failed validation: {}", record.name(), e);
                e.to_string()
            })
        }))
    }

    /// Every stored document, freshly read.
    pub fn all(&self) -> Result<Vec<Document>> {
        self.store.find_all()
    }

    /// Every stored protocol as a record, sorted by lowercase name.
    pub fn all_as_records(&self) -> Result<Vec<Record>> {
        let mut records = self.records()?;
        records.sort_by_key(|record| record.name().to_lowercase());
        Ok(records)
    }

    /// Canonical names of every stored protocol.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .records()?
            .iter()
            .map(|record| record.name().to_string())
            .collect())
    }

    /// Number of stored protocols.
    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    fn records(&self) -> Result<Vec<Record>> {
        Ok(self
            .store
            .find_all()?
            .into_iter()
            .map(|document| {
                Record::new(self.schema.clone(), self.store.clone(), document)
                    .with_field_threshold(self.field_threshold)
            })
            .collect())
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("protocol_threshold", &self.protocol_threshold)
            .field("field_threshold", &self.field_threshold)
            .finish()
    }
}
