//! Filesystem-backed storage
//!
//! Each storage id maps onto a base directory. Folder identifiers are joined
//! below that directory segment by segment; `.` and `..` segments are refused.

use super::{unique_name, DuplicationBehavior, FolderBatch, ResourceStorage, StorageInfo};
use crate::error::{ApiError, StorageError};
use crate::types::{CombinedIdentifier, FolderHandle, StorageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A storage mounted on a local directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalMount {
    #[serde(default)]
    pub name: String,

    /// Directory the storage root maps to
    pub base_path: PathBuf,

    #[serde(default = "default_online")]
    pub online: bool,

    /// Folders (relative to the storage root) below which creation is
    /// allowed; empty allows the whole storage.
    #[serde(default)]
    pub writable: Vec<String>,
}

fn default_online() -> bool {
    true
}

impl LocalMount {
    pub fn new(name: &str, base_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            base_path: base_path.into(),
            online: true,
            writable: Vec::new(),
        }
    }

    fn allows_write(&self, folder: &CombinedIdentifier) -> bool {
        if self.writable.is_empty() {
            return true;
        }
        let segments = folder.segments();
        self.writable.iter().any(|mount| {
            let mount: Vec<&str> = mount.split('/').filter(|s| !s.is_empty()).collect();
            segments.len() >= mount.len()
                && mount.iter().zip(segments).all(|(m, s)| *m == s.as_str())
        })
    }
}

/// Storages mapped onto local directories.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    mounts: BTreeMap<StorageId, LocalMount>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mount(mut self, id: StorageId, mount: LocalMount) -> Self {
        self.mounts.insert(id, mount);
        self
    }

    /// Build from configured mounts; base paths are resolved against
    /// `workspace_root` when relative.
    pub fn from_mounts<'a, I>(mounts: I, workspace_root: &Path) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = (&'a String, &'a LocalMount)>,
    {
        let mut storage = Self::new();
        for (id, mount) in mounts {
            let id = id
                .parse::<StorageId>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| {
                    ApiError::ConfigError(format!(
                        "Storage id '{}' must be a positive integer",
                        id
                    ))
                })?;
            let mut mount = mount.clone();
            if mount.base_path.is_relative() {
                mount.base_path = workspace_root.join(&mount.base_path);
            }
            if mount.base_path.exists() {
                mount.base_path = dunce::canonicalize(&mount.base_path)
                    .map_err(|e| ApiError::StorageError(StorageError::IoError(e)))?;
            }
            storage.mounts.insert(id, mount);
        }
        Ok(storage)
    }

    fn mount(&self, storage: StorageId) -> Result<&LocalMount, StorageError> {
        self.mounts
            .get(&storage)
            .ok_or(StorageError::StorageNotFound(storage))
    }

    fn online_mount(&self, storage: StorageId) -> Result<&LocalMount, StorageError> {
        let mount = self.mount(storage)?;
        if !mount.online {
            return Err(StorageError::Offline(storage));
        }
        Ok(mount)
    }

    fn local_path(
        &self,
        identifier: &CombinedIdentifier,
    ) -> Result<(PathBuf, &LocalMount), StorageError> {
        let mount = self.online_mount(identifier.storage_id())?;
        let mut path = mount.base_path.clone();
        for segment in identifier.segments() {
            check_segment(segment, identifier)?;
            path.push(segment);
        }
        Ok((path, mount))
    }
}

fn check_segment(segment: &str, identifier: &CombinedIdentifier) -> Result<(), StorageError> {
    if segment == "." || segment == ".." || segment.contains('\\') || segment.contains('\0') {
        return Err(StorageError::AccessDenied(identifier.to_string()));
    }
    Ok(())
}

/// Directory check that keeps "missing" apart from "not allowed".
fn is_dir(path: &Path, identifier: &CombinedIdentifier) -> Result<bool, StorageError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Err(StorageError::AccessDenied(identifier.to_string()))
        }
        Err(e) => Err(StorageError::IoError(e)),
    }
}

impl ResourceStorage for LocalStorage {
    fn exists(&self, identifier: &CombinedIdentifier) -> Result<bool, StorageError> {
        let (path, _) = self.local_path(identifier)?;
        let exists = is_dir(&path, identifier)?;
        debug!(folder = %identifier, path = %path.display(), exists, "Probed folder");
        Ok(exists)
    }

    fn is_online(&self, storage: StorageId) -> Result<bool, StorageError> {
        Ok(self.mount(storage)?.online)
    }

    fn storage_config(&self, storage: StorageId) -> Result<StorageInfo, StorageError> {
        let mount = self.mount(storage)?;
        let mut base_path = mount.base_path.to_string_lossy().to_string();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        Ok(StorageInfo {
            id: storage,
            name: mount.name.clone(),
            base_path,
            online: mount.online,
        })
    }

    fn create_folders(&self, batch: &FolderBatch) -> Result<(), StorageError> {
        let (target_path, mount) = self.local_path(&batch.target)?;
        if !is_dir(&target_path, &batch.target)? {
            return Err(StorageError::FolderNotFound(batch.target.to_string()));
        }

        let mut current = batch.target.clone();
        let mut current_path = target_path;
        for segment in batch.data.split('/').filter(|s| !s.is_empty()) {
            check_segment(segment, &batch.target)?;
            let candidate = current_path.join(segment);
            if is_dir(&candidate, &current.join(segment))? {
                current = current.join(segment);
                current_path = candidate;
                continue;
            }
            if !mount.allows_write(&current) {
                return Err(StorageError::AccessDenied(current.to_string()));
            }

            let name = if candidate.exists() {
                match batch.conflict {
                    DuplicationBehavior::Rename => {
                        unique_name(segment, |name| current_path.join(name).exists())
                            .ok_or_else(|| StorageError::CreationFailed {
                                target: current.join(segment).to_string(),
                                reason: "no free name left".to_string(),
                            })?
                    }
                    DuplicationBehavior::Replace => {
                        fs::remove_file(&candidate)?;
                        segment.to_string()
                    }
                    DuplicationBehavior::Cancel => {
                        return Err(StorageError::CreationFailed {
                            target: current.join(segment).to_string(),
                            reason: "a file with this name already exists".to_string(),
                        });
                    }
                }
            } else {
                segment.to_string()
            };

            let created = current_path.join(&name);
            match fs::create_dir(&created) {
                Ok(()) => {}
                // Lost a race against another creator; the folder is there.
                Err(e) if e.kind() == ErrorKind::AlreadyExists && created.is_dir() => {}
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    return Err(StorageError::AccessDenied(current.to_string()));
                }
                Err(e) => return Err(StorageError::IoError(e)),
            }
            current = current.join(&name);
            info!(folder = %current, path = %created.display(), "Created folder");
            current_path = created;
        }
        Ok(())
    }

    fn resolve_folder(
        &self,
        identifier: &CombinedIdentifier,
    ) -> Result<FolderHandle, StorageError> {
        let (path, _) = self.local_path(identifier)?;
        if is_dir(&path, identifier)? {
            Ok(FolderHandle::new(identifier.clone()))
        } else {
            Err(StorageError::FolderNotFound(identifier.to_string()))
        }
    }
}
