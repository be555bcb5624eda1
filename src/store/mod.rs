//! Resource Storage
//!
//! Seam to the host's resource layer: storages addressed by integer id,
//! folders addressed by combined identifiers. The resolver and materializer
//! only talk to [`ResourceStorage`]; `local` maps storages onto directories
//! and `memory` keeps everything in process for tests and dry runs.

pub mod local;
pub mod memory;

pub use local::{LocalMount, LocalStorage};
pub use memory::{MemoryStorage, StorageCall};

use crate::error::StorageError;
use crate::types::{CombinedIdentifier, FolderHandle, StorageId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do when a folder to be created collides with an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicationBehavior {
    /// Create the folder under a new, unused name.
    Rename,
    /// Replace the existing entry.
    Replace,
    /// Abort the creation.
    Cancel,
}

/// One folder creation request: `data` (a relative path such as `b/c`) is
/// created below `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderBatch {
    pub target: CombinedIdentifier,
    pub data: String,
    pub conflict: DuplicationBehavior,
}

impl fmt::Display for FolderBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} below {}", self.data, self.target)
    }
}

/// Storage description used for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub id: StorageId,
    pub name: String,
    pub base_path: String,
    pub online: bool,
}

/// Storage-layer primitives consumed by the materializer and the service.
pub trait ResourceStorage: Send + Sync {
    /// Whether the folder exists. A missing folder is `Ok(false)`; denied
    /// access and unknown storages are errors.
    fn exists(&self, identifier: &CombinedIdentifier) -> Result<bool, StorageError>;

    fn is_online(&self, storage: StorageId) -> Result<bool, StorageError>;

    fn storage_config(&self, storage: StorageId) -> Result<StorageInfo, StorageError>;

    /// Create every missing folder of `batch.data` below `batch.target`.
    fn create_folders(&self, batch: &FolderBatch) -> Result<(), StorageError>;

    /// Handle for an existing folder.
    fn resolve_folder(&self, identifier: &CombinedIdentifier)
        -> Result<FolderHandle, StorageError>;
}

/// Name for `name` not yet present according to `taken`, e.g. `name_01`.
pub(crate) fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> Option<String> {
    (1..=99)
        .map(|n| format!("{}_{:02}", name, n))
        .find(|candidate| !taken(candidate))
}
