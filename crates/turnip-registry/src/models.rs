//! # Core Data Models for the Protocol Registry
//!
//! This module defines the value and error types shared by records, the
//! catalog and the storage layer.
//!
//! ## Value Model
//!
//! A protocol document is a flat mapping from field name to [`FieldValue`].
//! Values are either scalars (text, boolean, number) or a list of strings.
//! The same representation is used in memory and on disk: documents are
//! serialized as plain JSON objects, so a stored protocol looks like
//!
//! ```text
//! {"_id": 3, "name": "HTTP", "alias": ["http2"], "category": "application"}
//! ```
//!
//! ## Error Taxonomy
//!
//! | Error | Raised when |
//! |-------|-------------|
//! | `UnknownProtocol` / `UnknownField` | resolution found zero matches |
//! | `AmbiguousMatch` | resolution found more than one match |
//! | `AlreadyExists` | creating a protocol whose name already resolves |
//! | `DuplicateValue` | appending a value already present in a list field |
//! | `MissingMandatoryField` | a mandatory field is absent |
//! | `InvalidBooleanValue` | a boolean field received something else |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Name of the bookkeeping identifier assigned by the store.
///
/// It is never part of the logical field set handed back to callers unless
/// explicitly requested.
pub const INTERNAL_ID: &str = "_id";

/// A raw protocol document, as read from or written to the store.
///
/// Keys are kept sorted so serialized documents are deterministic.
pub type Document = BTreeMap<String, FieldValue>;

/// The value held by a single field of a protocol document.
///
/// Serialized untagged, so a document maps one-to-one onto a JSON object.
///
/// # Example
///
/// ```rust
/// use turnip_registry::FieldValue;
///
/// let ports = FieldValue::from(vec!["80".to_string(), "8080".to_string()]);
/// assert_eq!(ports.to_string(), "80, 8080");
/// assert!(FieldValue::from("").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean scalar.
    Bool(bool),

    /// Numeric scalar (internal identifiers, port numbers, ...).
    Number(serde_json::Number),

    /// Text scalar. An empty string is a valid "present but unset" value.
    Text(String),

    /// Ordered sequence of strings.
    List(Vec<String>),
}

impl FieldValue {
    /// Returns true for an empty string or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// Returns true if the value is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }

    /// Returns the text of a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Coerces the value to a sequence.
    ///
    /// Lists pass through, every scalar becomes a single-element list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items,
            FieldValue::Text(s) => vec![s],
            other => vec![other.to_string()],
        }
    }

    /// Returns true if this value is already a member of `items`.
    ///
    /// Empty strings are never members. A list value counts as present as
    /// soon as one of its non-empty elements is.
    pub fn is_member_of(&self, items: &[String]) -> bool {
        match self {
            FieldValue::List(values) => values
                .iter()
                .filter(|v| !v.is_empty())
                .any(|v| items.contains(v)),
            FieldValue::Text(s) => !s.is_empty() && items.contains(s),
            other => items.contains(&other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(value.into())
    }
}

/// Concatenates two sequences, dropping empty strings and repeated elements.
///
/// The first occurrence of each element keeps its position.
pub fn merge_distinct(old: Vec<String>, new: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(old.len() + new.len());
    for item in old.into_iter().chain(new) {
        if !item.is_empty() && !merged.contains(&item) {
            merged.push(item);
        }
    }
    merged
}

/// Errors that can occur during registry operations.
///
/// Every variant carries a human-readable message; none of them is retried
/// internally.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The underlying sled database failed.
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// A document could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No protocol matches the requested name or alias.
    #[error("Protocol '{0}' not found.")]
    UnknownProtocol(String),

    /// No field of the protocol matches the requested field name.
    #[error("Protocol '{protocol}' has no field '{field}'.")]
    UnknownField {
        /// Canonical name of the protocol that was searched.
        protocol: String,
        /// Field name as requested by the caller.
        field: String,
    },

    /// Resolution found more than one candidate.
    #[error("Multiple match found, please choose between {}.", .candidates.join(", "))]
    AmbiguousMatch {
        /// Every candidate that matched, in scan order.
        candidates: Vec<String>,
    },

    /// A protocol with this name already exists.
    #[error("Protocol '{0}' already exists.")]
    AlreadyExists(String),

    /// The value is already present in the list field.
    #[error("Field '{0}' already contains this value.")]
    DuplicateValue(String),

    /// A mandatory field is absent from the protocol.
    #[error("Missing mandatory field '{field}' for {protocol}.")]
    MissingMandatoryField {
        /// Name of the first absent mandatory field.
        field: String,
        /// Canonical name of the offending protocol.
        protocol: String,
    },

    /// A boolean field received a value other than `true` or `false`.
    #[error("Field '{0}' only accepts 'true' or 'false'.")]
    InvalidBooleanValue(String),

    /// A stored document lacks a usable name.
    #[error("Corrupted document: {0}")]
    CorruptedDocument(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
