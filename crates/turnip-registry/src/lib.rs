//! # Turnip Registry - Protocol Record Engine
//!
//! The registry keeps a catalog of network protocol descriptions: each
//! protocol is a schema-flexible document with a name, aliases and an
//! open-ended set of scalar or list-valued fields.
//!
//! ## Purpose
//!
//! This crate implements the record resolution and mutation engine:
//!
//! 1. **Protocol Resolution** - Case-insensitive lookup of a protocol by
//!    name or alias. An exact hit short-circuits; several partial hits are
//!    reported as ambiguous.
//!
//! 2. **Field Resolution** - The same matching rules applied to the field
//!    names of a single record.
//!
//! 3. **Type-Aware Mutation** - Scalar fields are overwritten, list fields
//!    are appended to (rejecting duplicates) or replaced, and empty strings
//!    never end up in a list.
//!
//! 4. **Validation** - Every protocol must carry the mandatory fields of the
//!    schema.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         CATALOG                             │
//! │   resolve / add / delete / check / list / count             │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ builds                       │ find_all, insert_one,
//!                ▼                              │ delete_one
//! ┌─────────────────────────────┐               │
//! │           RECORD            │               ▼
//! │ resolve_field / set / add   │   ┌─────────────────────────┐
//! │ append / check / to_dict    │──▶│  DocumentStore (Sled)   │
//! └──────────────┬──────────────┘   └─────────────────────────┘
//!                │ uses                update_one
//!                ▼
//!     ┌─────────────────────┐   ┌─────────────────────┐
//!     │  search (fuzzy)     │   │  Schema (types,     │
//!     │                     │   │  mandatory fields)  │
//!     └─────────────────────┘   └─────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use turnip_registry::{Catalog, CatalogError, FieldValue, Schema, Storage};
//!
//! let catalog = Catalog::new(Arc::new(Storage::temporary().unwrap()), Schema::default());
//!
//! catalog.add(&catalog.create("TCP", &["transmission control"]).unwrap()).unwrap();
//!
//! // Names are case-insensitive: this is the same protocol.
//! let duplicate = catalog.create("tcp", &[]).unwrap();
//! assert!(matches!(catalog.add(&duplicate), Err(CatalogError::AlreadyExists(_))));
//!
//! let mut tcp = catalog.resolve("transmission").unwrap();
//! tcp.set("category", "transport", false).unwrap();
//! tcp.add("ports", "0").unwrap();
//! tcp.append("ports", "1").unwrap();
//! assert_eq!(tcp.value("ports"), Some(&FieldValue::from(vec!["0", "1"])));
//!
//! // Nothing is cached: a fresh lookup sees the write.
//! let fresh = catalog.resolve("TCP").unwrap();
//! assert_eq!(fresh.value("category"), Some(&FieldValue::from("transport")));
//! ```

pub mod catalog;
pub mod models;
pub mod record;
pub mod schema;
pub mod search;
pub mod storage;

pub use catalog::Catalog;
pub use models::{CatalogError, Document, FieldValue, Result, INTERNAL_ID};
pub use record::Record;
pub use schema::{FieldSpec, FieldType, Schema};
pub use storage::{DocumentStore, Storage};

#[cfg(test)]
mod tests;
