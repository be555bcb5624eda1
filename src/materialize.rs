//! Folder Materializer
//!
//! Makes sure a folder identified by `"<storageId>:/<path>"` exists. Asking the
//! storage to create the whole nested path would check write access on the
//! storage root first, which fails for actors that can only reach a sub-mount.
//! Instead the deepest existing ancestor is found by probing upwards, and only
//! the missing suffix is created below it in a single request.

use crate::error::{MaterializeError, StorageError};
use crate::store::{DuplicationBehavior, FolderBatch, ResourceStorage};
use crate::types::{CombinedIdentifier, FolderHandle};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Deepest existing ancestor and the segments missing below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationPlan {
    pub base: CombinedIdentifier,
    pub missing: Vec<String>,
}

impl CreationPlan {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Creation request for the missing segments, if any.
    pub fn batch(&self) -> Option<FolderBatch> {
        if self.is_complete() {
            return None;
        }
        Some(FolderBatch {
            target: self.base.clone(),
            data: self.missing.join("/"),
            conflict: DuplicationBehavior::Rename,
        })
    }
}

/// Walk upwards from `identifier` until `exists` confirms an ancestor.
///
/// The storage root is never probed. "Does not exist" answers, including a
/// `FolderNotFound` error, move one level up; every other error is returned
/// unchanged.
pub fn plan_creation<E>(
    identifier: &CombinedIdentifier,
    mut exists: E,
) -> Result<CreationPlan, StorageError>
where
    E: FnMut(&CombinedIdentifier) -> Result<bool, StorageError>,
{
    let mut ancestor = identifier.segments().to_vec();
    let mut missing = VecDeque::new();

    while !ancestor.is_empty() {
        let candidate = CombinedIdentifier::from_parts(identifier.storage_id(), ancestor.clone());
        match exists(&candidate) {
            Ok(true) => break,
            Ok(false) | Err(StorageError::FolderNotFound(_)) => {
                if let Some(segment) = ancestor.pop() {
                    missing.push_front(segment);
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(CreationPlan {
        base: CombinedIdentifier::from_parts(identifier.storage_id(), ancestor),
        missing: missing.into(),
    })
}

/// Parse `raw`, plan, and issue at most one creation request via `create`.
///
/// Returns the validated identifier; validation happens before any probe.
pub fn materialize_with<E, C>(
    raw: &str,
    exists: E,
    mut create: C,
) -> Result<CombinedIdentifier, MaterializeError>
where
    E: FnMut(&CombinedIdentifier) -> Result<bool, StorageError>,
    C: FnMut(&FolderBatch) -> Result<(), StorageError>,
{
    let identifier = CombinedIdentifier::parse(raw)?;
    let plan = plan_creation(&identifier, exists)?;
    debug!(folder = %identifier, base = %plan.base, missing = plan.missing.len(), "Planned folder creation");

    if let Some(batch) = plan.batch() {
        create(&batch)?;
        info!(folder = %identifier, base = %batch.target, created = %batch.data, "Created missing folders");
    }
    Ok(identifier)
}

/// Binds the materialization algorithm to a [`ResourceStorage`].
pub struct FolderMaterializer<'a, S: ?Sized> {
    storage: &'a S,
}

impl<'a, S: ResourceStorage + ?Sized> FolderMaterializer<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Ensure the folder exists and return its handle.
    pub fn materialize(&self, raw: &str) -> Result<FolderHandle, MaterializeError> {
        let identifier = materialize_with(
            raw,
            |candidate| self.storage.exists(candidate),
            |batch| self.storage.create_folders(batch),
        )?;
        Ok(self.storage.resolve_folder(&identifier)?)
    }
}
