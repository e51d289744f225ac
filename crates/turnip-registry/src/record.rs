//! # Protocol Records
//!
//! A [`Record`] is the in-memory mirror of one protocol document. It owns
//! field resolution, type-aware mutation and mandatory-field validation.
//!
//! ## Mutation Model
//!
//! Every mutation is write-through: the new value is computed, written to
//! the store as a single-field update keyed by the protocol name, and only
//! then copied into the in-memory document. A failed write leaves the
//! record untouched. Setting the name field renames the stored document.
//!
//! | Field type | `set(.., replace = false)` | `set(.., replace = true)` |
//! |------------|----------------------------|---------------------------|
//! | scalar | overwrite | overwrite |
//! | list variants | append, reject duplicates | replace |
//!
//! Empty strings and repeated elements never survive in a list field after
//! a mutation.

use crate::models::{merge_distinct, CatalogError, Document, FieldValue, Result, INTERNAL_ID};
use crate::schema::{FieldType, Schema};
use crate::search::search;
use crate::storage::DocumentStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One protocol document.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use turnip_registry::{Document, FieldValue, Record, Schema, Storage};
///
/// let schema = Arc::new(Schema::default());
/// let store = Arc::new(Storage::temporary().unwrap());
///
/// let mut fields = Document::new();
/// fields.insert("name".to_string(), FieldValue::from("HTTP"));
/// fields.insert("alias".to_string(), FieldValue::from(vec!["http2"]));
///
/// let record = Record::create(schema, store, fields).unwrap();
/// assert_eq!(record.names(), vec!["HTTP", "http2"]);
/// assert!(record.check().is_ok());
/// ```
#[derive(Clone)]
pub struct Record {
    /// Field name to value, including the internal identifier if stored.
    document: Document,

    /// Field layout shared with the catalog.
    schema: Arc<Schema>,

    /// Store receiving write-through updates.
    store: Arc<dyn DocumentStore>,

    /// Fuzziness used when resolving field names.
    field_threshold: f64,
}

impl Record {
    /// Wraps a raw document without filling or validating it.
    ///
    /// This is the path used for documents read back from storage.
    pub fn new(schema: Arc<Schema>, store: Arc<dyn DocumentStore>, document: Document) -> Self {
        Self {
            document,
            schema,
            store,
            field_threshold: 0.0,
        }
    }

    /// Builds a new protocol from authored fields.
    ///
    /// Every mandatory field missing from `fields` is added as an empty
    /// string, then the record is validated. Nothing is persisted; use
    /// [`Catalog::add`](crate::Catalog::add) for that.
    pub fn create(schema: Arc<Schema>, store: Arc<dyn DocumentStore>, fields: Document) -> Result<Self> {
        let mut record = Self::new(schema, store, fields);
        record.fill();
        record.check()?;
        Ok(record)
    }

    /// Sets the fuzziness used by [`resolve_field`](Self::resolve_field).
    pub fn with_field_threshold(mut self, threshold: f64) -> Self {
        self.field_threshold = threshold;
        self
    }

    /// Canonical protocol name, or an empty string if unset.
    pub fn name(&self) -> &str {
        self.document
            .get(&self.schema.name_field)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    /// Canonical name followed by every alias, empty strings removed.
    pub fn names(&self) -> Vec<String> {
        let aliases = self
            .document
            .get(&self.schema.alias_field)
            .cloned()
            .map(FieldValue::into_list)
            .unwrap_or_default();

        std::iter::once(self.name().to_string())
            .chain(aliases)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Logical field names currently set, internal identifier excluded.
    pub fn fields(&self) -> Vec<&str> {
        self.document
            .keys()
            .map(String::as_str)
            .filter(|key| *key != INTERNAL_ID)
            .collect()
    }

    /// Current value of a field, by exact name.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.document.get(field)
    }

    /// Finds the field matching `name`, ignoring case.
    ///
    /// Returns the canonical field name and its current value.
    ///
    /// # Errors
    ///
    /// - `CatalogError::UnknownField` if no field matches.
    /// - `CatalogError::AmbiguousMatch` if several fields match.
    pub fn resolve_field(&self, name: &str) -> Result<(&str, &FieldValue)> {
        let fields = self.fields();
        let matches = search(name, &fields, self.field_threshold);
        debug!("Field '{}' of '{}' resolved to {:?}", name, self.name(), matches);

        match matches.as_slice() {
            [field] => {
                let (key, value) = self
                    .document
                    .get_key_value(*field)
                    .ok_or_else(|| self.unknown_field(name))?;
                Ok((key.as_str(), value))
            }
            [] => Err(self.unknown_field(name)),
            many => Err(CatalogError::AmbiguousMatch {
                candidates: many.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }

    /// Updates an existing field.
    ///
    /// List fields append `value` unless `replace` is set or the field is
    /// still empty, in which case `value` becomes the whole list. Scalar
    /// fields are overwritten. Boolean fields accept `true` / `false` text.
    ///
    /// # Errors
    ///
    /// - Resolution errors from [`resolve_field`](Self::resolve_field).
    /// - `CatalogError::DuplicateValue` when appending a value already present.
    /// - `CatalogError::InvalidBooleanValue` for a bad boolean input.
    /// - `CatalogError::UnknownProtocol` if the stored document is gone.
    /// - `CatalogError::AlreadyExists` when renaming onto a name already stored.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>, replace: bool) -> Result<()> {
        let value = value.into();
        let (field, old) = self.resolve_field(field)?;
        let (field, old) = (field.to_string(), old.clone());

        let new_value = match self.schema.field_type(&field) {
            kind if kind.is_list() => {
                if !replace && !old.is_empty() {
                    let old_items = old.into_list();
                    if value.is_member_of(&old_items) {
                        return Err(self.duplicate_value(&field));
                    }
                    FieldValue::List(merge_distinct(old_items, value.into_list()))
                } else {
                    FieldValue::List(merge_distinct(Vec::new(), value.into_list()))
                }
            }
            FieldType::Bool => self.coerce_bool(&field, value)?,
            _ => value,
        };

        self.persist(field, new_value)
    }

    /// Introduces a field that is not yet part of the record.
    ///
    /// If the name is exactly an existing field, this behaves like
    /// [`set`](Self::set). A name that only partially matches existing
    /// fields is rejected as ambiguous instead of being shadowed.
    pub fn add(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let lowered = field.to_lowercase();
        let collisions: Vec<String> = {
            let fields = self.fields();
            search(field, &fields, self.field_threshold)
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        if let [existing] = collisions.as_slice() {
            if existing.to_lowercase() == lowered {
                let existing = existing.clone();
                return self.set(&existing, value, false);
            }
        }
        if !collisions.is_empty() {
            let mut candidates = vec![field.to_string()];
            candidates.extend(collisions);
            return Err(CatalogError::AmbiguousMatch { candidates });
        }

        let placeholder = if self.schema.field_type(field).is_list() {
            FieldValue::List(Vec::new())
        } else {
            FieldValue::Text(String::new())
        };
        self.document.insert(field.to_string(), placeholder);

        let result = self.set(field, value, true);
        if result.is_err() {
            self.document.remove(field);
        }
        result
    }

    /// Appends `value` to a field, turning a scalar into a list.
    ///
    /// # Errors
    ///
    /// `CatalogError::DuplicateValue` if `value` is already a member.
    pub fn append(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let (field, old) = self.resolve_field(field)?;
        let (field, old) = (field.to_string(), old.clone());

        let old_items = old.into_list();
        if value.is_member_of(&old_items) {
            return Err(self.duplicate_value(&field));
        }

        let merged = merge_distinct(old_items, value.into_list());
        self.set(&field, FieldValue::List(merged), true)
    }

    /// Validates that every mandatory field is present.
    ///
    /// # Errors
    ///
    /// `CatalogError::MissingMandatoryField` naming the first absent field.
    pub fn check(&self) -> Result<()> {
        match self
            .schema
            .mandatory()
            .find(|field| !self.document.contains_key(*field))
        {
            Some(field) => Err(CatalogError::MissingMandatoryField {
                field: field.to_string(),
                protocol: self.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Plain mapping of the record's fields.
    ///
    /// The internal identifier is dropped when `exclude_id` is set.
    pub fn to_dict(&self, exclude_id: bool) -> Document {
        self.document
            .iter()
            .filter(|(key, _)| !(exclude_id && key.as_str() == INTERNAL_ID))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn fill(&mut self) {
        let missing: Vec<String> = self
            .schema
            .mandatory()
            .filter(|field| !self.document.contains_key(*field))
            .map(str::to_string)
            .collect();

        for field in missing {
            self.document.insert(field, FieldValue::Text(String::new()));
        }
    }

    fn persist(&mut self, field: String, value: FieldValue) -> Result<()> {
        if !self.store.update_one(self.name(), &field, &value)? {
            return Err(CatalogError::UnknownProtocol(self.name().to_string()));
        }
        info!("Updated field '{}' of protocol '{}'", field, self.name());
        self.document.insert(field, value);
        Ok(())
    }

    fn coerce_bool(&self, field: &str, value: FieldValue) -> Result<FieldValue> {
        match value {
            FieldValue::Bool(b) => Ok(FieldValue::Bool(b)),
            FieldValue::Text(s) if s.is_empty() => Ok(FieldValue::Text(s)),
            FieldValue::Text(s) => Schema::parse_bool(&s)
                .map(FieldValue::Bool)
                .ok_or_else(|| CatalogError::InvalidBooleanValue(self.schema.label(field).to_string())),
            _ => Err(CatalogError::InvalidBooleanValue(self.schema.label(field).to_string())),
        }
    }

    fn unknown_field(&self, field: &str) -> CatalogError {
        CatalogError::UnknownField {
            protocol: self.name().to_string(),
            field: field.to_string(),
        }
    }

    fn duplicate_value(&self, field: &str) -> CatalogError {
        CatalogError::DuplicateValue(self.schema.label(field).to_string())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("name", &self.name())
            .field("fields", &self.fields())
            .finish()
    }
}
