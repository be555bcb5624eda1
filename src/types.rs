//! Core identifier and context types.

use crate::error::IdentifierError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage identifier as used by the host's resource layer
pub type StorageId = u32;

/// Record/field being edited when an upload folder is requested.
///
/// `table` and `field` may both be absent, in which case only the
/// all-tables default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionContext {
    pub table: Option<String>,
    pub field: Option<String>,
    pub container_id: u64,
}

impl ResolutionContext {
    pub fn new(table: Option<&str>, field: Option<&str>, container_id: u64) -> Self {
        Self {
            table: table.map(str::to_string),
            field: field.map(str::to_string),
            container_id,
        }
    }
}

/// Storage-qualified folder path: `"<storageId>:/<seg1>/.../<segN>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombinedIdentifier {
    storage_id: StorageId,
    segments: Vec<String>,
}

impl CombinedIdentifier {
    /// Parse and validate a combined identifier.
    ///
    /// Leading and trailing slashes around the path are tolerated; the storage
    /// id must be a positive integer and interior segments must be non-empty.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let (id, path) = raw
            .split_once(':')
            .ok_or_else(|| IdentifierError::MissingSeparator(raw.to_string()))?;

        let storage_id = id
            .trim()
            .parse::<StorageId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| IdentifierError::InvalidStorageId {
                id: id.to_string(),
                identifier: raw.to_string(),
            })?;

        let path = path.trim().trim_matches('/');
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').map(str::to_string).collect::<Vec<_>>()
        };
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(IdentifierError::EmptySegment(raw.to_string()));
        }

        Ok(Self {
            storage_id,
            segments,
        })
    }

    /// Whether `raw` looks like a storage-qualified identifier (`<digits>:`).
    pub fn is_combined(raw: &str) -> bool {
        raw.split_once(':')
            .map(|(id, _)| {
                let id = id.trim();
                !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(false)
    }

    /// Build from already validated parts.
    pub fn from_parts(storage_id: StorageId, segments: Vec<String>) -> Self {
        Self {
            storage_id,
            segments,
        }
    }

    pub fn storage_id(&self) -> StorageId {
        self.storage_id
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path portion without the storage prefix, e.g. `a/b/c`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Identifier with `relative` (slash separated) appended.
    pub fn join(&self, relative: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(
            relative
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Self::from_parts(self.storage_id, segments)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self::from_parts(self.storage_id, segments))
    }
}

impl fmt::Display for CombinedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:/{}", self.storage_id, self.path())
    }
}

impl FromStr for CombinedIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A folder the storage layer has confirmed to exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderHandle {
    identifier: CombinedIdentifier,
}

impl FolderHandle {
    pub fn new(identifier: CombinedIdentifier) -> Self {
        Self { identifier }
    }

    pub fn identifier(&self) -> &CombinedIdentifier {
        &self.identifier
    }

    pub fn storage_id(&self) -> StorageId {
        self.identifier.storage_id()
    }

    /// Folder name; empty for the storage root.
    pub fn name(&self) -> &str {
        self.identifier
            .segments()
            .last()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Identifier of a direct or nested sub-folder (not checked for existence).
    pub fn child(&self, relative: &str) -> CombinedIdentifier {
        self.identifier.join(relative)
    }

    pub fn parent(&self) -> Option<CombinedIdentifier> {
        self.identifier.parent()
    }
}

impl fmt::Display for FolderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.identifier.fmt(f)
    }
}
