//! # Turnip Core
//!
//! Configuration and facade for the Turnip protocol catalog.
//! Wires a JSON configuration to the Sled-backed store and the record
//! engine of `turnip-registry`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  TURNIP CORE                     │
//! ├──────────────────────────────────────────────────┤
//! │                                                  │
//! │   TurnipConfig ──▶ Turnip (facade)               │
//! │   (storage,          │                           │
//! │    search,           ├──▶ Storage (Sled)         │
//! │    schema)           └──▶ Catalog ──▶ Record     │
//! │                                                  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use turnip_core::{Turnip, TurnipConfig};
//!
//! let config = TurnipConfig::load("config/turnip.json")?;
//! let turnip = Turnip::new(config)?;
//!
//! let mut tcp = turnip.catalog().resolve("tcp")?;
//! tcp.append("ports", "443")?;
//!
//! for message in turnip.report()? {
//!     eprintln!("{}", message);
//! }
//! ```

mod config;
mod error;
mod turnip;

pub use config::{SearchConfig, StorageConfig, TurnipConfig};
pub use error::TurnipError;
pub use turnip::Turnip;

// Re-export registry types for convenience
pub use turnip_registry::{Catalog, CatalogError, FieldType, FieldValue, Record, Schema};

/// Core result type for turnip operations.
pub type Result<T> = std::result::Result<T, TurnipError>;
