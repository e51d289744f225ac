//! # Integration Tests for the Protocol Registry
//!
//! These tests exercise the catalog and records together against a
//! temporary Sled store.
//!
//! ## Test Categories
//!
//! 1. **Resolution**: exact hits, fuzzy hits, ambiguity, unknown names
//! 2. **Creation**: mandatory fill, uniqueness
//! 3. **Mutation**: list append/replace, duplicates, empty strings
//! 4. **Deletion**: existence check before touching the store
//! 5. **Validation**: full report without aborting on the first failure

use crate::catalog::Catalog;
use crate::models::{CatalogError, Document, FieldValue, Result};
use crate::record::Record;
use crate::schema::Schema;
use crate::storage::{DocumentStore, Storage};
use std::cell::Cell;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

/// Store wrapper counting destructive calls.
struct CountingStore {
    inner: Storage,
    deletes: Cell<usize>,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: Storage::temporary().unwrap(),
            deletes: Cell::new(0),
        }
    }
}

impl DocumentStore for CountingStore {
    fn insert_one(&self, document: &Document) -> Result<()> {
        self.inner.insert_one(document)
    }

    fn update_one(&self, name: &str, field: &str, value: &FieldValue) -> Result<bool> {
        self.inner.update_one(name, field, value)
    }

    fn delete_one(&self, name: &str) -> Result<bool> {
        self.deletes.set(self.deletes.get() + 1);
        self.inner.delete_one(name)
    }

    fn find_all(&self) -> Result<Vec<Document>> {
        self.inner.find_all()
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }
}

fn catalog() -> Catalog {
    Catalog::new(Arc::new(Storage::temporary().unwrap()), Schema::default())
}

/// Builds a catalog from `(name, alias)` pairs; an empty alias means none.
fn catalog_with(entries: &[(&str, &str)]) -> Catalog {
    let catalog = catalog();
    for (name, alias) in entries {
        let aliases: Vec<&str> = if alias.is_empty() { vec![] } else { vec![*alias] };
        catalog.add(&catalog.create(name, &aliases).unwrap()).unwrap();
    }
    catalog
}

fn ambiguous_candidates(err: CatalogError) -> Vec<String> {
    match err {
        CatalogError::AmbiguousMatch { mut candidates } => {
            candidates.sort();
            candidates
        }
        other => panic!("expected AmbiguousMatch, got {:?}", other),
    }
}

// =============================================================================
// Resolution Tests
// =============================================================================

#[test]
fn test_exact_name_wins_over_fuzzy_neighbours() {
    let catalog = catalog_with(&[("HTTP", ""), ("HTTPS", ""), ("HTTP/3", "h3")]);

    assert_eq!(catalog.resolve("http").unwrap().name(), "HTTP");
    assert_eq!(catalog.resolve("HTTPS").unwrap().name(), "HTTPS");
}

#[test]
fn test_exact_alias_wins() {
    let catalog = catalog_with(&[("QUIC", "h3"), ("HTTP/3", "h3-29")]);
    assert_eq!(catalog.resolve("H3").unwrap().name(), "QUIC");
}

#[test]
fn test_unknown_protocol() {
    let catalog = catalog_with(&[("ARP", "")]);
    let err = catalog.resolve("bgp").unwrap_err();
    assert!(matches!(err, CatalogError::UnknownProtocol(ref n) if n == "bgp"));
    assert_eq!(err.to_string(), "Protocol 'bgp' not found.");
}

#[test]
fn test_ambiguous_fuzzy_matches_listed() {
    let catalog = catalog_with(&[("HTTP", ""), ("HTTPS", ""), ("FTP", "")]);

    let err = catalog.resolve("ttp").unwrap_err();
    assert_eq!(ambiguous_candidates(err), vec!["HTTP", "HTTPS"]);
}

#[test]
fn test_single_fuzzy_match_resolves() {
    let catalog = catalog_with(&[("Modbus", ""), ("DNP3", "")]);
    assert_eq!(catalog.resolve("odbu").unwrap().name(), "Modbus");
}

#[test]
fn test_similarity_threshold_applies_to_names() {
    let catalog = catalog_with(&[("Modbus", ""), ("DNP3", "")]);
    assert_eq!(catalog.resolve("modbuss").unwrap().name(), "Modbus");

    let strict = catalog.clone().with_thresholds(0.0, 0.0);
    assert!(matches!(
        strict.resolve("modbuss"),
        Err(CatalogError::UnknownProtocol(_))
    ));
}

// =============================================================================
// Creation Tests
// =============================================================================

#[test]
fn test_mandatory_fill_scenario() {
    let store: Arc<Storage> = Arc::new(Storage::temporary().unwrap());
    let schema = Arc::new(Schema::default());

    let mut fields = Document::new();
    fields.insert("name".to_string(), FieldValue::from("HTTP"));
    fields.insert("alias".to_string(), FieldValue::from(vec!["http2"]));

    let raw = Record::new(schema.clone(), store.clone(), fields.clone());
    let err = raw.check().unwrap_err();
    assert_eq!(err.to_string(), "Missing mandatory field 'category' for HTTP.");

    let created = Record::create(schema, store, fields).unwrap();
    assert!(created.check().is_ok());
    assert_eq!(created.value("category"), Some(&FieldValue::from("")));
    assert_eq!(created.value("description"), Some(&FieldValue::from("")));
}

#[test]
fn test_add_is_case_insensitively_unique() {
    let catalog = catalog_with(&[("TCP", "")]);

    let err = catalog.add(&catalog.create("tcp", &[]).unwrap()).unwrap_err();
    assert!(matches!(err, CatalogError::AlreadyExists(ref n) if n == "TCP"));
    assert_eq!(catalog.count().unwrap(), 1);
}

#[test]
fn test_add_propagates_ambiguity() {
    let catalog = catalog_with(&[("HTTPS", ""), ("SHTTP", "")]);

    let err = catalog.add(&catalog.create("HTTP", &[]).unwrap()).unwrap_err();
    assert_eq!(ambiguous_candidates(err), vec!["HTTPS", "SHTTP"]);
    assert_eq!(catalog.count().unwrap(), 2);
}

#[test]
fn test_round_trip_through_create() {
    let catalog = catalog_with(&[("SNMP", "snmpv3")]);
    let mut snmp = catalog.resolve("snmp").unwrap();
    snmp.add("ports", vec!["161", "162"]).unwrap();
    snmp.set("encrypted", "false", false).unwrap_err();
    snmp.add("encrypted", "false").unwrap();

    let rebuilt = catalog.create_record(snmp.to_dict(true)).unwrap();
    assert_eq!(rebuilt.to_dict(true), snmp.to_dict(true));
    assert_eq!(rebuilt.names(), snmp.names());
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[test]
fn test_list_append_rejects_duplicate() {
    let catalog = catalog_with(&[("IPsec", "")]);
    let mut ipsec = catalog.resolve("ipsec").unwrap();
    ipsec.add("specs", vec!["a", "b"]).unwrap();

    let err = ipsec.append("specs", "a").unwrap_err();
    assert_eq!(err.to_string(), "Field 'Specifications' already contains this value.");

    ipsec.append("SPECS", "c").unwrap();
    let stored = catalog.resolve("IPsec").unwrap();
    assert_eq!(stored.value("specs"), Some(&FieldValue::from(vec!["a", "b", "c"])));
}

#[test]
fn test_empty_string_never_added() {
    let catalog = catalog_with(&[("OSPF", "")]);
    let mut ospf = catalog.resolve("ospf").unwrap();
    ospf.add("links", vec!["IP", ""]).unwrap();
    assert_eq!(ospf.value("links"), Some(&FieldValue::from(vec!["IP"])));

    ospf.append("links", "").unwrap();
    ospf.set("links", "", false).unwrap();
    assert_eq!(ospf.value("links"), Some(&FieldValue::from(vec!["IP"])));
}

#[test]
fn test_replace_idempotent() {
    let catalog = catalog_with(&[("RIP", "")]);
    let mut rip = catalog.resolve("rip").unwrap();
    rip.add("ports", "520").unwrap();

    rip.set("ports", "521", true).unwrap();
    let first = catalog.resolve("rip").unwrap().value("ports").cloned();
    rip.set("ports", "521", true).unwrap();
    let second = catalog.resolve("rip").unwrap().value("ports").cloned();

    assert_eq!(first, Some(FieldValue::from(vec!["521"])));
    assert_eq!(first, second);
}

#[test]
fn test_append_list_with_repeated_element() {
    let catalog = catalog_with(&[("RIP", "")]);
    let mut rip = catalog.resolve("rip").unwrap();
    rip.add("ports", "520").unwrap();

    rip.append("ports", vec!["9", "9"]).unwrap();
    let stored = catalog.resolve("rip").unwrap();
    assert_eq!(stored.value("ports"), Some(&FieldValue::from(vec!["520", "9"])));

    rip.set("ports", vec!["53", "53", ""], true).unwrap();
    assert_eq!(rip.value("ports"), Some(&FieldValue::from(vec!["53"])));
}

#[test]
fn test_rename_keeps_record_writable() {
    let catalog = catalog_with(&[("HTTP", ""), ("SMTP", "")]);
    let mut http = catalog.resolve("http").unwrap();
    http.set("name", "Web", false).unwrap();
    assert_eq!(http.name(), "Web");

    let mut web = catalog.resolve("Web").unwrap();
    web.set("category", "application", false).unwrap();
    assert_eq!(
        catalog.resolve("web").unwrap().value("category"),
        Some(&FieldValue::from("application"))
    );
    assert!(matches!(
        catalog.resolve("HTTP"),
        Err(CatalogError::UnknownProtocol(_))
    ));

    // The old name is free again and must not clobber the renamed document.
    catalog.add(&catalog.create("HTTP", &[]).unwrap()).unwrap();
    let mut names = catalog.list().unwrap();
    names.sort();
    assert_eq!(names, vec!["HTTP", "SMTP", "Web"]);

    catalog.delete(&web).unwrap();
    assert_eq!(catalog.count().unwrap(), 2);
    assert!(matches!(
        catalog.resolve("web"),
        Err(CatalogError::UnknownProtocol(_))
    ));
}

#[test]
fn test_rename_onto_existing_name_rejected() {
    let catalog = catalog_with(&[("HTTP", ""), ("SMTP", "")]);
    let mut http = catalog.resolve("HTTP").unwrap();

    let err = http.set("name", "SMTP", false).unwrap_err();
    assert!(matches!(err, CatalogError::AlreadyExists(ref n) if n == "SMTP"));
    assert_eq!(http.name(), "HTTP");
    assert_eq!(catalog.count().unwrap(), 2);
    assert_eq!(catalog.resolve("smtp").unwrap().name(), "SMTP");
}

#[test]
fn test_alias_mutation_changes_resolution() {
    let catalog = catalog_with(&[("SMB", "")]);
    let mut smb = catalog.resolve("smb").unwrap();
    smb.set("alias", "cifs", false).unwrap();

    assert_eq!(catalog.resolve("CIFS").unwrap().name(), "SMB");
}

// =============================================================================
// Deletion Tests
// =============================================================================

#[test]
fn test_delete_existing() {
    let catalog = catalog_with(&[("Telnet", ""), ("SSH", "")]);
    let telnet = catalog.resolve("telnet").unwrap();

    catalog.delete(&telnet).unwrap();
    assert_eq!(catalog.list().unwrap(), vec!["SSH"]);
    assert!(matches!(
        catalog.resolve("telnet"),
        Err(CatalogError::UnknownProtocol(_))
    ));
}

#[test]
fn test_delete_unknown_does_not_touch_store() {
    let store = Arc::new(CountingStore::new());
    let catalog = Catalog::new(store.clone(), Schema::default());
    catalog.add(&catalog.create("SSH", &[]).unwrap()).unwrap();

    let ghost = catalog.create("Gopher", &[]).unwrap();
    let err = catalog.delete(&ghost).unwrap_err();

    assert!(matches!(err, CatalogError::UnknownProtocol(_)));
    assert_eq!(store.deletes.get(), 0);
    assert_eq!(catalog.count().unwrap(), 1);
}

#[test]
fn test_delete_fails_when_nothing_stored_under_name() {
    let catalog = catalog_with(&[("SSH2", "")]);

    // "SSH" resolves to SSH2 by containment, but nothing is stored as "SSH".
    let ghost = catalog.create("SSH", &[]).unwrap();
    let err = catalog.delete(&ghost).unwrap_err();

    assert!(matches!(err, CatalogError::UnknownProtocol(ref n) if n == "SSH"));
    assert_eq!(catalog.count().unwrap(), 1);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_check_reports_every_failure_in_order() {
    let store = Arc::new(Storage::temporary().unwrap());
    let catalog = Catalog::new(store.clone(), Schema::default());
    catalog.add(&catalog.create("LDAP", &[]).unwrap()).unwrap();

    for (name, with_category) in [("zmq", true), ("Bgp", false), ("amqp", false)] {
        let mut doc = Document::new();
        doc.insert("name".to_string(), FieldValue::from(name));
        doc.insert("alias".to_string(), FieldValue::from(""));
        if with_category {
            doc.insert("category".to_string(), FieldValue::from(""));
        }
        store.insert_one(&doc).unwrap();
    }

    let report: Vec<String> = catalog.check().unwrap().collect();
    assert_eq!(
        report,
        vec![
            "Missing mandatory field 'category' for amqp.",
            "Missing mandatory field 'category' for Bgp.",
            "Missing mandatory field 'description' for zmq.",
        ]
    );
}

#[test]
fn test_check_clean_catalog() {
    let catalog = catalog_with(&[("LDAP", ""), ("Kerberos", "krb5")]);
    assert_eq!(catalog.check().unwrap().count(), 0);
}
