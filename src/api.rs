//! Upload Folder API
//!
//! Single entry point the host calls when it needs an upload destination:
//! resolve the configured path, make sure the folder exists, hand back its
//! handle. Any failure falls back to the host's current default folder.

use crate::error::ApiError;
use crate::expand::{Clock, Expander, SystemClock};
use crate::info::{InfoSink, NullSink, UploadFolderInfo};
use crate::materialize::FolderMaterializer;
use crate::records::{NoRecords, RecordLookup};
use crate::resolver::{Attempt, PathResolver};
use crate::store::ResourceStorage;
use crate::tree::ConfigTree;
use crate::types::{CombinedIdentifier, FolderHandle, ResolutionContext};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Supplies the two configuration trees for a resolution call.
pub trait ConfigSource: Send + Sync {
    /// Installation-wide configuration effective for `container_id`.
    fn installation_config(&self, container_id: u64) -> Result<ConfigTree, ApiError>;

    /// Configuration of the acting user.
    fn actor_config(&self) -> Result<ConfigTree, ApiError>;
}

/// Fixed trees, independent of the container.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    installation: ConfigTree,
    actor: ConfigTree,
}

impl StaticConfigSource {
    pub fn new(installation: ConfigTree, actor: ConfigTree) -> Self {
        Self {
            installation,
            actor,
        }
    }
}

impl ConfigSource for StaticConfigSource {
    fn installation_config(&self, _container_id: u64) -> Result<ConfigTree, ApiError> {
        Ok(self.installation.clone())
    }

    fn actor_config(&self) -> Result<ConfigTree, ApiError> {
        Ok(self.actor.clone())
    }
}

/// Resolves and materializes default upload folders.
pub struct UploadFolderService {
    config: Arc<dyn ConfigSource>,
    storage: Arc<dyn ResourceStorage>,
    records: Arc<dyn RecordLookup>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn InfoSink>,
}

impl UploadFolderService {
    pub fn new(config: Arc<dyn ConfigSource>, storage: Arc<dyn ResourceStorage>) -> Self {
        Self {
            config,
            storage,
            records: Arc::new(NoRecords),
            clock: Arc::new(SystemClock),
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_records(mut self, records: Arc<dyn RecordLookup>) -> Self {
        self.records = records;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_info_sink(mut self, sink: Arc<dyn InfoSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn storage(&self) -> &dyn ResourceStorage {
        self.storage.as_ref()
    }

    /// Every lookup made for `context`, up to the first match.
    pub fn explain(&self, context: &ResolutionContext) -> Result<Vec<Attempt>, ApiError> {
        let installation = self.config.installation_config(context.container_id)?;
        let actor = self.config.actor_config()?;
        let expander = Expander::new(self.clock.as_ref(), self.records.as_ref());
        Ok(PathResolver::new(expander).explain(context, &installation, &actor))
    }

    /// Configured path for `context`; empty when nothing applies.
    pub fn resolve_path(&self, context: &ResolutionContext) -> Result<String, ApiError> {
        let installation = self.config.installation_config(context.container_id)?;
        let actor = self.config.actor_config()?;
        let expander = Expander::new(self.clock.as_ref(), self.records.as_ref());
        Ok(PathResolver::new(expander).resolve(context, &installation, &actor))
    }

    /// Turn a resolved path into a folder.
    ///
    /// Combined identifiers are materialized. Any other non-empty value names a
    /// sub-folder of `current_default`, used only if it already exists.
    /// `Ok(None)` means the default should stay.
    pub fn ensure_folder(
        &self,
        resolved: &str,
        current_default: Option<&FolderHandle>,
    ) -> Result<Option<FolderHandle>, ApiError> {
        let resolved = resolved.trim();
        if resolved.is_empty() {
            return Ok(None);
        }

        if CombinedIdentifier::is_combined(resolved) {
            let handle = FolderMaterializer::new(self.storage.as_ref()).materialize(resolved)?;
            return Ok(Some(handle));
        }

        let Some(default) = current_default else {
            return Ok(None);
        };
        let candidate = default.child(resolved);
        if self.storage.exists(&candidate)? {
            return Ok(Some(self.storage.resolve_folder(&candidate)?));
        }
        debug!(folder = %candidate, "Sub-folder of default does not exist, keeping default");
        Ok(None)
    }

    /// Resolve, create if needed, and return the upload folder for `context`.
    ///
    /// Returns `current_default` when nothing is configured or anything fails.
    pub fn resolve_and_ensure_upload_folder(
        &self,
        context: &ResolutionContext,
        current_default: FolderHandle,
    ) -> FolderHandle {
        let resolved = match self.resolve_path(context) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "Upload folder configuration unavailable, keeping default");
                return current_default;
            }
        };

        let folder = match self.ensure_folder(&resolved, Some(&current_default)) {
            Ok(Some(folder)) => {
                info!(folder = %folder, container_id = context.container_id, "Using configured upload folder");
                folder
            }
            Ok(None) => current_default,
            Err(e) => {
                warn!(path = %resolved, error = %e, "Upload folder unavailable, keeping default");
                current_default
            }
        };

        self.publish_info(context, &resolved);
        folder
    }

    /// Display info for `context`, when table, field and path are all known.
    pub fn folder_info(
        &self,
        context: &ResolutionContext,
        resolved: &str,
    ) -> Option<UploadFolderInfo> {
        let (Some(table), Some(field)) = (context.table.as_deref(), context.field.as_deref())
        else {
            return None;
        };
        if table.is_empty() || field.is_empty() || resolved.trim().is_empty() {
            return None;
        }
        Some(UploadFolderInfo::describe(
            self.storage.as_ref(),
            field,
            resolved,
        ))
    }

    fn publish_info(&self, context: &ResolutionContext, resolved: &str) {
        let Some(info) = self.folder_info(context, resolved) else {
            return;
        };
        if let Err(e) = self.sink.publish(&info) {
            warn!(field = %info.field, error = %e, "Failed to publish upload folder info");
        }
    }
}
