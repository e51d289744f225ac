//! # Protocol Schema
//!
//! Declares which fields a protocol may carry, which of them are mandatory
//! and how each one merges on update. The registry never hard-codes field
//! names: everything it needs comes from a [`Schema`] value, which callers
//! usually load from configuration.

use serde::{Deserialize, Serialize};

/// Declared type of a protocol field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Plain text, overwritten on update.
    Str,
    /// `true` / `false`.
    Bool,
    /// Ordered list of strings.
    List,
    /// List of names of other protocols.
    LinkList,
    /// List of packet references.
    PktList,
}

impl FieldType {
    /// List variants share the same append/replace semantics.
    pub fn is_list(self) -> bool {
        matches!(self, FieldType::List | FieldType::LinkList | FieldType::PktList)
    }
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key used in documents.
    pub name: String,

    /// Human-readable label used in messages.
    pub label: String,

    /// Declared type.
    #[serde(rename = "type")]
    pub kind: FieldType,

    /// Whether every protocol must carry this field.
    #[serde(default)]
    pub mandatory: bool,
}

impl FieldSpec {
    /// Creates a field declaration.
    pub fn new(name: &str, label: &str, kind: FieldType, mandatory: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            mandatory,
        }
    }
}

/// Field layout of protocol documents.
///
/// # Example
///
/// ```rust
/// use turnip_registry::schema::{FieldType, Schema};
///
/// let schema = Schema::default();
/// assert_eq!(schema.name_field, "name");
/// assert!(schema.field_type("links").is_list());
/// assert_eq!(schema.field_type("not-declared"), FieldType::Str);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Field holding the canonical protocol name.
    pub name_field: String,

    /// Field holding the protocol aliases.
    pub alias_field: String,

    /// Declared fields, in display order.
    pub fields: Vec<FieldSpec>,
}

impl Default for Schema {
    fn default() -> Self {
        use FieldType::*;

        Self {
            name_field: "name".to_string(),
            alias_field: "alias".to_string(),
            fields: vec![
                FieldSpec::new("name", "Name", Str, true),
                FieldSpec::new("alias", "Alias", List, true),
                FieldSpec::new("category", "Category", Str, true),
                FieldSpec::new("description", "Description", Str, true),
                FieldSpec::new("layer", "OSI layer", Str, false),
                FieldSpec::new("ports", "Ports", List, false),
                FieldSpec::new("specs", "Specifications", List, false),
                FieldSpec::new("resources", "Resources", List, false),
                FieldSpec::new("links", "Related protocols", LinkList, false),
                FieldSpec::new("packets", "Packets", PktList, false),
                FieldSpec::new("security", "Security", List, false),
                FieldSpec::new("encrypted", "Encrypted", Bool, false),
                FieldSpec::new("notes", "Notes", Str, false),
            ],
        }
    }
}

impl Schema {
    /// Looks up a field declaration by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Mandatory field names, in declaration order.
    pub fn mandatory(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.mandatory)
            .map(|f| f.name.as_str())
    }

    /// Declared type of a field. Undeclared fields are plain text.
    pub fn field_type(&self, name: &str) -> FieldType {
        self.field(name).map(|f| f.kind).unwrap_or(FieldType::Str)
    }

    /// Human-readable label of a field, falling back to its key.
    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.field(name).map(|f| f.label.as_str()).unwrap_or(name)
    }

    /// Parses user input for a boolean field.
    pub fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}
