//! Upload folder display info
//!
//! Advisory side channel: after resolution the human readable destination is
//! handed to a presentation layer, keyed by field name, so it can be shown next
//! to the upload control. Nothing here may influence the resolved folder.

use crate::error::ApiError;
use crate::store::ResourceStorage;
use crate::types::{CombinedIdentifier, StorageId};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Display data for one upload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFolderInfo {
    pub field: String,
    pub display_path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadFolderInfo {
    /// Describe `resolved` for display.
    ///
    /// Combined identifiers are shown relative to the storage base path when
    /// the storage is reachable; otherwise the raw value is kept and the info
    /// is marked invalid. Storage errors never escape.
    pub fn describe<S>(storage: &S, field: &str, resolved: &str) -> Self
    where
        S: ResourceStorage + ?Sized,
    {
        let mut info = Self {
            field: field.to_string(),
            display_path: resolved.to_string(),
            valid: true,
            message: None,
        };

        let Some((id, path)) = resolved.split_once(':') else {
            return info;
        };
        if !CombinedIdentifier::is_combined(resolved) {
            return info;
        }
        let Ok(storage_id) = id.trim().parse::<StorageId>() else {
            return info;
        };

        let online = storage.is_online(storage_id);
        let config = storage.storage_config(storage_id);
        match (online, config) {
            (Ok(true), Ok(config)) => {
                if !config.base_path.is_empty() {
                    info.display_path = format!(
                        "{}/{}",
                        config.base_path.trim_end_matches('/'),
                        path.trim_start_matches('/')
                    );
                }
            }
            (Ok(false), _) => {
                info.valid = false;
                info.message = Some("Storage is unavailable or unreachable".to_string());
            }
            _ => {
                info.valid = false;
                info.message = Some(format!("Storage with id {} does not exist", storage_id));
            }
        }
        info
    }
}

/// Receiver of display info.
pub trait InfoSink: Send + Sync {
    fn publish(&self, info: &UploadFolderInfo) -> Result<(), ApiError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl InfoSink for NullSink {
    fn publish(&self, _info: &UploadFolderInfo) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Keeps the latest info per field.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<BTreeMap<String, UploadFolderInfo>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<UploadFolderInfo> {
        self.entries.lock().get(field).cloned()
    }
}

impl InfoSink for CollectingSink {
    fn publish(&self, info: &UploadFolderInfo) -> Result<(), ApiError> {
        self.entries
            .lock()
            .insert(info.field.clone(), info.clone());
        Ok(())
    }
}

/// Renders inline script blocks that fill `window.uploadFolderInfo`.
#[derive(Debug, Default)]
pub struct InlineScriptSink {
    blocks: Mutex<BTreeMap<String, String>>,
}

impl InlineScriptSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script block for one field.
    pub fn script_for(info: &UploadFolderInfo) -> Result<String, ApiError> {
        let field = script_string(&info.field)?;
        let path = script_string(&info.display_path)?;
        Ok(format!(
            "if (!window.uploadFolderInfo) window.uploadFolderInfo = {{}};\nwindow.uploadFolderInfo[{}] = {};\n",
            field, path
        ))
    }

    /// All blocks keyed by `uploadFolderData_<field>`.
    pub fn blocks(&self) -> BTreeMap<String, String> {
        self.blocks.lock().clone()
    }

    /// Concatenated script for every published field.
    pub fn render(&self) -> String {
        self.blocks.lock().values().cloned().collect()
    }
}

/// JSON string literal that cannot end the surrounding `<script>` element.
fn script_string(value: &str) -> Result<String, ApiError> {
    serde_json::to_string(value)
        .map(|literal| literal.replace("</", "<\\/"))
        .map_err(|e| ApiError::InfoDelivery(e.to_string()))
}

impl InfoSink for InlineScriptSink {
    fn publish(&self, info: &UploadFolderInfo) -> Result<(), ApiError> {
        let script = Self::script_for(info)?;
        self.blocks
            .lock()
            .insert(format!("uploadFolderData_{}", info.field), script);
        Ok(())
    }
}
