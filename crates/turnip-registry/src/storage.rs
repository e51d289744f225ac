//! # Persistent Storage Layer
//!
//! The registry talks to persistence through the [`DocumentStore`] trait:
//! single-document writes keyed by the exact protocol name, plus a
//! full-collection read. [`Storage`] implements it on top of Sled, an
//! embedded database.
//!
//! ## Storage Structure
//!
//! | Tree | Key | Value |
//! |------|-----|-------|
//! | `protocols` | exact protocol name | JSON-encoded [`Document`] |
//!
//! Inserts never overwrite: writing a new document under a key already in
//! use fails with `AlreadyExists`. Updating the name field moves the
//! document to its new key. Every write is a single Sled operation except
//! such a rename (insert under the new key, then remove the old one). No
//! multi-document atomicity is provided; see the catalog module for the
//! consistency model.
//!
//! ## References
//!
//! - Sled documentation: <https://sled.rs/>

use crate::models::{CatalogError, Document, FieldValue, Result, INTERNAL_ID};
use std::path::Path;
use tracing::debug;

/// Tree name for storing protocol documents.
const PROTOCOL_TREE: &str = "protocols";

/// Default key holding the protocol name in stored documents.
const DEFAULT_NAME_KEY: &str = "name";

/// Write and read operations the registry needs from a document store.
///
/// All filters are equality on the exact protocol name.
pub trait DocumentStore {
    /// Inserts a new document.
    fn insert_one(&self, document: &Document) -> Result<()>;

    /// Sets a single field of the document named `name`.
    ///
    /// Setting the name field itself renames the document. Returns `false`
    /// when no document matched.
    fn update_one(&self, name: &str, field: &str, value: &FieldValue) -> Result<bool>;

    /// Deletes the document named `name`.
    ///
    /// Returns `false` when no document matched.
    fn delete_one(&self, name: &str) -> Result<bool>;

    /// Reads every document of the collection.
    fn find_all(&self) -> Result<Vec<Document>>;

    /// Number of documents in the collection.
    fn count(&self) -> Result<usize>;
}

/// Sled-backed protocol store.
///
/// # Example
///
/// ```rust
/// use turnip_registry::storage::{DocumentStore, Storage};
/// use turnip_registry::{Document, FieldValue};
///
/// let storage = Storage::temporary().unwrap();
///
/// let mut doc = Document::new();
/// doc.insert("name".to_string(), FieldValue::from("TCP"));
/// storage.insert_one(&doc).unwrap();
///
/// assert_eq!(storage.count().unwrap(), 1);
/// assert!(storage.find_all().unwrap()[0].contains_key("_id"));
/// ```
#[derive(Clone)]
pub struct Storage {
    /// The underlying Sled database.
    db: sled::Db,

    /// Tree holding protocol documents.
    protocols: sled::Tree,

    /// Document field used as the tree key.
    name_key: String,
}

impl Storage {
    /// Opens or creates a storage database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Database` if the path is invalid, permissions
    /// are insufficient or the database is corrupted.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let protocols = db.open_tree(PROTOCOL_TREE)?;

        Ok(Storage {
            db,
            protocols,
            name_key: DEFAULT_NAME_KEY.to_string(),
        })
    }

    /// Creates a temporary storage, discarded on drop.
    pub fn temporary() -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        let protocols = db.open_tree(PROTOCOL_TREE)?;

        Ok(Storage {
            db,
            protocols,
            name_key: DEFAULT_NAME_KEY.to_string(),
        })
    }

    /// Uses `field` instead of `name` as the document key.
    pub fn with_name_key(mut self, field: &str) -> Self {
        self.name_key = field.to_string();
        self
    }

    /// Flushes all pending writes to disk.
    ///
    /// Returns the number of bytes flushed.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }

    fn load(&self, name: &str) -> Result<Option<Document>> {
        match self.protocols.get(name.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn store(&self, name: &str, document: &Document) -> Result<()> {
        let bytes = serde_json::to_vec(document)?;
        self.protocols.insert(name.as_bytes(), bytes)?;
        Ok(())
    }

    /// Writes `document` under `name` only if that key is free.
    fn store_new(&self, name: &str, document: &Document) -> Result<()> {
        let bytes = serde_json::to_vec(document)?;
        self.protocols
            .compare_and_swap(name.as_bytes(), None::<&[u8]>, Some(bytes))?
            .map_err(|_| CatalogError::AlreadyExists(name.to_string()))
    }

    fn name_of<'a>(&self, document: &'a Document) -> Result<&'a str> {
        document
            .get(&self.name_key)
            .and_then(FieldValue::as_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CatalogError::CorruptedDocument("document has no name".to_string()))
    }
}

impl DocumentStore for Storage {
    fn insert_one(&self, document: &Document) -> Result<()> {
        let name = self.name_of(document)?;

        let mut document = document.clone();
        if !document.contains_key(INTERNAL_ID) {
            document.insert(INTERNAL_ID.to_string(), FieldValue::from(self.db.generate_id()?));
        }

        self.store_new(name, &document)
    }

    fn update_one(&self, name: &str, field: &str, value: &FieldValue) -> Result<bool> {
        let mut document = match self.load(name)? {
            Some(document) => document,
            None => return Ok(false),
        };

        document.insert(field.to_string(), value.clone());

        // Renaming moves the document to its new key.
        let new_name = self.name_of(&document)?;
        if new_name != name {
            self.store_new(new_name, &document)?;
            self.protocols.remove(name.as_bytes())?;
            debug!("Protocol '{}' renamed to '{}'", name, new_name);
            return Ok(true);
        }

        self.store(name, &document)?;
        Ok(true)
    }

    fn delete_one(&self, name: &str) -> Result<bool> {
        Ok(self.protocols.remove(name.as_bytes())?.is_some())
    }

    fn find_all(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        for result in self.protocols.iter() {
            let (_, bytes) = result?;
            documents.push(serde_json::from_slice(&bytes)?);
        }

        Ok(documents)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.protocols.len())
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("name_key", &self.name_key)
            .field("protocols_count", &self.protocols.len())
            .finish()
    }
}
