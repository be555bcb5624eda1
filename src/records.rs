//! Record lookup
//!
//! Placeholder expansion needs a handful of text fields from the record that
//! contains the edited element. The host owns the records; this module defines
//! the seam and an in-memory implementation used by the CLI and tests.

use crate::error::{ApiError, ConfigError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Read access to host records.
pub trait RecordLookup: Send + Sync {
    /// Fetch `fields` of record `id` in `table`.
    ///
    /// Missing records yield an empty map; missing fields are simply absent.
    fn record_fields(
        &self,
        table: &str,
        id: u64,
        fields: &[&str],
    ) -> Result<HashMap<String, String>, ApiError>;
}

/// Lookup with no records at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecords;

impl RecordLookup for NoRecords {
    fn record_fields(
        &self,
        _table: &str,
        _id: u64,
        _fields: &[&str],
    ) -> Result<HashMap<String, String>, ApiError> {
        Ok(HashMap::new())
    }
}

/// Records held in memory, keyed by table then id.
///
/// Loadable from TOML shaped as:
///
/// ```toml
/// [pages.12]
/// title = "Über uns"
/// nav_title = "About"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct InMemoryRecords {
    tables: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: &str, id: u64, field: &str, value: impl Into<String>) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }

    pub fn with(mut self, table: &str, id: u64, field: &str, value: impl Into<String>) -> Self {
        self.insert(table, id, field, value);
        self
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

impl RecordLookup for InMemoryRecords {
    fn record_fields(
        &self,
        table: &str,
        id: u64,
        fields: &[&str],
    ) -> Result<HashMap<String, String>, ApiError> {
        let Some(record) = self
            .tables
            .get(table)
            .and_then(|rows| rows.get(&id.to_string()))
        else {
            return Ok(HashMap::new());
        };

        Ok(fields
            .iter()
            .filter_map(|field| {
                record
                    .get(*field)
                    .map(|value| ((*field).to_string(), value.clone()))
            })
            .collect())
    }
}
