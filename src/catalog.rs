//! Resort catalog
//!
//! The catalog is the registry of known ski resorts. It is loaded once at
//! process start from an embedded JSON document, validated eagerly and
//! never mutated afterwards, so it can be shared across requests without
//! locking.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A known ski resort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResortRecord {
    /// Stable identifier, unique within the catalog
    pub id: String,
    /// Name shown to the user on a successful lookup
    pub canonical_name: String,
    /// Alternative names the resort is commonly searched by
    #[serde(default)]
    pub aliases: Vec<String>,
    pub location: Coordinates,
}

impl ResortRecord {
    /// All names this record can be matched by (canonical first)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Errors raised while loading the catalog. These are startup failures:
/// the process refuses to start on a malformed catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog contains no resorts")]
    Empty,

    #[error("invalid resort entry `{id}`: {message}")]
    InvalidEntry { id: String, message: String },

    #[error("duplicate resort id `{id}`")]
    DuplicateId { id: String },
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    resorts: Vec<ResortRecord>,
}

/// Immutable registry of known resorts, in insertion order
#[derive(Debug, Clone)]
pub struct ResortCatalog {
    records: Vec<ResortRecord>,
}

impl ResortCatalog {
    /// Load the catalog shipped with the binary
    pub fn load_default() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("resorts.json"))
    }

    /// Parse and validate a catalog from a JSON document
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_records(document.resorts)
    }

    /// Build a catalog from already-parsed records, validating each entry
    pub fn from_records(records: Vec<ResortRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen_ids = HashSet::new();
        for record in &records {
            Self::validate_record(record)?;
            if !seen_ids.insert(record.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }

        Ok(Self { records })
    }

    fn validate_record(record: &ResortRecord) -> Result<(), CatalogError> {
        let invalid = |message: &str| CatalogError::InvalidEntry {
            id: record.id.clone(),
            message: message.to_string(),
        };

        if record.id.trim().is_empty() {
            return Err(invalid("blank id"));
        }
        if record.canonical_name.trim().is_empty() {
            return Err(invalid("blank canonical name"));
        }
        if record.aliases.iter().any(|alias| alias.trim().is_empty()) {
            return Err(invalid("blank alias"));
        }
        if !(-90.0..=90.0).contains(&record.location.latitude) {
            return Err(invalid("latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&record.location.longitude) {
            return Err(invalid("longitude out of range"));
        }

        Ok(())
    }

    /// All records, in catalog insertion order
    #[must_use]
    pub fn records(&self) -> &[ResortRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, lat: f64, lon: f64) -> ResortRecord {
        ResortRecord {
            id: id.to_string(),
            canonical_name: name.to_string(),
            aliases: Vec::new(),
            location: Coordinates {
                latitude: lat,
                longitude: lon,
            },
        }
    }

    #[test]
    fn test_default_catalog_loads() {
        let catalog = ResortCatalog::load_default().expect("embedded catalog should be valid");
        assert!(!catalog.is_empty());
        assert!(
            catalog
                .records()
                .iter()
                .any(|r| r.canonical_name == "Aspen Snowmass")
        );
    }

    #[test]
    fn test_default_catalog_aliases_cover_partial_names() {
        let catalog = ResortCatalog::load_default().expect("embedded catalog should be valid");
        let aspen = catalog
            .records()
            .iter()
            .find(|r| r.id == "aspen-snowmass")
            .expect("Aspen entry present");
        assert!(aspen.aliases.iter().any(|a| a == "Aspen"));
        assert_eq!(aspen.location.latitude, 39.1911);
        assert_eq!(aspen.location.longitude, -106.8175);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let result = ResortCatalog::from_json("{ not json");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let result = ResortCatalog::from_json(r#"{ "resorts": [] }"#);
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let records = vec![
            record("vail", "Vail", 39.6, -106.4),
            record("vail", "Vail Again", 39.7, -106.5),
        ];
        let result = ResortCatalog::from_records(records);
        assert!(matches!(result, Err(CatalogError::DuplicateId { id }) if id == "vail"));
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let result = ResortCatalog::from_records(vec![record("x", "X", 95.0, 0.0)]);
        assert!(matches!(result, Err(CatalogError::InvalidEntry { .. })));

        let result = ResortCatalog::from_records(vec![record("x", "X", 0.0, -190.0)]);
        assert!(matches!(result, Err(CatalogError::InvalidEntry { .. })));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let result = ResortCatalog::from_records(vec![record("x", "   ", 0.0, 0.0)]);
        assert!(matches!(result, Err(CatalogError::InvalidEntry { .. })));
    }

    #[test]
    fn test_record_names_include_aliases() {
        let mut rec = record("aspen-snowmass", "Aspen Snowmass", 39.1911, -106.8175);
        rec.aliases = vec!["Aspen".to_string()];
        let names: Vec<&str> = rec.names().collect();
        assert_eq!(names, vec!["Aspen Snowmass", "Aspen"]);
    }
}
