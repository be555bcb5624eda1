//! In-memory storage
//!
//! Keeps the folder set in process and records every call, so callers can
//! assert exactly which probes and creation requests were issued.

use super::{unique_name, DuplicationBehavior, FolderBatch, ResourceStorage, StorageInfo};
use crate::error::StorageError;
use crate::types::{CombinedIdentifier, FolderHandle, StorageId};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// A recorded storage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Exists(String),
    IsOnline(StorageId),
    StorageConfig(StorageId),
    CreateFolders(FolderBatch),
    ResolveFolder(String),
}

#[derive(Default)]
struct State {
    folders: HashSet<CombinedIdentifier>,
    calls: Vec<StorageCall>,
}

/// Storage that lives entirely in memory.
#[derive(Default)]
pub struct MemoryStorage {
    storages: BTreeMap<StorageId, StorageInfo>,
    denied: HashSet<CombinedIdentifier>,
    read_only: HashSet<CombinedIdentifier>,
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an online storage.
    pub fn with_storage(mut self, id: StorageId, name: &str, base_path: &str) -> Self {
        self.storages.insert(
            id,
            StorageInfo {
                id,
                name: name.to_string(),
                base_path: base_path.to_string(),
                online: true,
            },
        );
        self
    }

    /// Mark a registered storage offline.
    pub fn offline(mut self, id: StorageId) -> Self {
        if let Some(info) = self.storages.get_mut(&id) {
            info.online = false;
        }
        self
    }

    /// Add an existing folder; its ancestors are added as well.
    pub fn with_folder(self, identifier: &str) -> Self {
        if let Ok(identifier) = CombinedIdentifier::parse(identifier) {
            let mut state = self.state.lock();
            let mut current = Some(identifier);
            while let Some(folder) = current {
                current = folder.parent();
                if !folder.is_root() {
                    state.folders.insert(folder);
                }
            }
        }
        self
    }

    /// Probing this folder fails with access denied.
    pub fn deny(mut self, identifier: &str) -> Self {
        if let Ok(identifier) = CombinedIdentifier::parse(identifier) {
            self.denied.insert(identifier);
        }
        self
    }

    /// Creating folders directly below this folder fails with access denied.
    pub fn read_only(mut self, identifier: &str) -> Self {
        if let Ok(identifier) = CombinedIdentifier::parse(identifier) {
            self.read_only.insert(identifier);
        }
        self
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<StorageCall> {
        self.state.lock().calls.clone()
    }

    /// Recorded creation requests only.
    pub fn creation_calls(&self) -> Vec<FolderBatch> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                StorageCall::CreateFolders(batch) => Some(batch.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        CombinedIdentifier::parse(identifier)
            .map(|id| id.is_root() || self.state.lock().folders.contains(&id))
            .unwrap_or(false)
    }

    fn record(&self, call: StorageCall) {
        self.state.lock().calls.push(call);
    }

    fn check_storage(&self, storage: StorageId) -> Result<&StorageInfo, StorageError> {
        let info = self
            .storages
            .get(&storage)
            .ok_or(StorageError::StorageNotFound(storage))?;
        if !info.online {
            return Err(StorageError::Offline(storage));
        }
        Ok(info)
    }

    fn folder_exists(&self, identifier: &CombinedIdentifier) -> Result<bool, StorageError> {
        self.check_storage(identifier.storage_id())?;
        if self.denied.contains(identifier) {
            return Err(StorageError::AccessDenied(identifier.to_string()));
        }
        Ok(identifier.is_root() || self.state.lock().folders.contains(identifier))
    }
}

impl ResourceStorage for MemoryStorage {
    fn exists(&self, identifier: &CombinedIdentifier) -> Result<bool, StorageError> {
        self.record(StorageCall::Exists(identifier.to_string()));
        self.folder_exists(identifier)
    }

    fn is_online(&self, storage: StorageId) -> Result<bool, StorageError> {
        self.record(StorageCall::IsOnline(storage));
        self.storages
            .get(&storage)
            .map(|info| info.online)
            .ok_or(StorageError::StorageNotFound(storage))
    }

    fn storage_config(&self, storage: StorageId) -> Result<StorageInfo, StorageError> {
        self.record(StorageCall::StorageConfig(storage));
        self.storages
            .get(&storage)
            .cloned()
            .ok_or(StorageError::StorageNotFound(storage))
    }

    fn create_folders(&self, batch: &FolderBatch) -> Result<(), StorageError> {
        self.record(StorageCall::CreateFolders(batch.clone()));
        if !self.folder_exists(&batch.target)? {
            return Err(StorageError::FolderNotFound(batch.target.to_string()));
        }

        let mut current = batch.target.clone();
        for segment in batch.data.split('/').filter(|s| !s.is_empty()) {
            if self.read_only.contains(&current) {
                return Err(StorageError::AccessDenied(current.to_string()));
            }
            let candidate = current.join(segment);
            let mut state = self.state.lock();
            if state.folders.contains(&candidate) {
                current = candidate;
                continue;
            }
            // A denied entry occupies the name without being visible.
            let next = if self.denied.contains(&candidate) {
                match batch.conflict {
                    DuplicationBehavior::Rename => {
                        let renamed = unique_name(segment, |name| {
                            let taken = current.join(name);
                            state.folders.contains(&taken) || self.denied.contains(&taken)
                        })
                        .ok_or_else(|| StorageError::CreationFailed {
                            target: candidate.to_string(),
                            reason: "no free name left".to_string(),
                        })?;
                        current.join(&renamed)
                    }
                    DuplicationBehavior::Replace | DuplicationBehavior::Cancel => {
                        return Err(StorageError::AccessDenied(candidate.to_string()));
                    }
                }
            } else {
                candidate
            };
            info!(folder = %next, "Created folder");
            state.folders.insert(next.clone());
            current = next;
        }
        Ok(())
    }

    fn resolve_folder(
        &self,
        identifier: &CombinedIdentifier,
    ) -> Result<FolderHandle, StorageError> {
        self.record(StorageCall::ResolveFolder(identifier.to_string()));
        if self.folder_exists(identifier)? {
            Ok(FolderHandle::new(identifier.clone()))
        } else {
            Err(StorageError::FolderNotFound(identifier.to_string()))
        }
    }
}
