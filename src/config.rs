//! Configuration System
//!
//! Layered runtime configuration for the `upfold` front end: built-in defaults,
//! the global file, workspace files, then `UPFOLD__*` environment variables.
//! Tells the tool where to find the installation and actor trees, the record
//! table, and which local directories back which storage ids.

use crate::api::StaticConfigSource;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::records::InMemoryRecords;
use crate::store::{LocalMount, LocalStorage};
use crate::tree::ConfigTree;
use config::Environment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpfoldConfig {
    /// Configuration tree files
    #[serde(default)]
    pub trees: TreeFiles,

    /// TOML file with container records for `{title}`-style tokens
    #[serde(default)]
    pub records: Option<PathBuf>,

    /// Local storages keyed by storage id
    #[serde(default)]
    pub storages: HashMap<String, LocalMount>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locations of the installation and actor trees.
///
/// Files ending in `.toml` are read as TOML, anything else as TSconfig text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeFiles {
    pub installation: Option<PathBuf>,
    pub actor: Option<PathBuf>,
}

impl TreeFiles {
    /// Load both trees; a missing entry yields an empty tree.
    pub fn load(&self, workspace_root: &Path) -> Result<StaticConfigSource, ApiError> {
        let installation = load_tree(self.installation.as_deref(), workspace_root)?;
        let actor = load_tree(self.actor.as_deref(), workspace_root)?;
        Ok(StaticConfigSource::new(installation, actor))
    }
}

fn resolve_path(path: &Path, workspace_root: &Path) -> PathBuf {
    if path.is_relative() {
        workspace_root.join(path)
    } else {
        path.to_path_buf()
    }
}

fn load_tree(path: Option<&Path>, workspace_root: &Path) -> Result<ConfigTree, ApiError> {
    let Some(path) = path else {
        return Ok(ConfigTree::new());
    };
    let path = resolve_path(path, workspace_root);
    let tree = if path.extension().is_some_and(|ext| ext == "toml") {
        ConfigTree::from_toml_file(&path)?
    } else {
        ConfigTree::from_tsconfig_file(&path)?
    };
    Ok(tree)
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Storage(String, String),
    Tree(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(id, msg) => write!(f, "Storage '{}': {}", id, msg),
            ValidationError::Tree(msg) => write!(f, "Trees: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl UpfoldConfig {
    /// Validate the entire configuration
    pub fn validate(&self, workspace_root: &Path) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (id, mount) in &self.storages {
            if !id.parse::<u32>().is_ok_and(|id| id > 0) {
                errors.push(ValidationError::Storage(
                    id.clone(),
                    "storage id must be a positive integer".to_string(),
                ));
            }
            if mount.base_path.as_os_str().is_empty() {
                errors.push(ValidationError::Storage(
                    id.clone(),
                    "base_path cannot be empty".to_string(),
                ));
            }
        }

        for (label, path) in [
            ("installation", &self.trees.installation),
            ("actor", &self.trees.actor),
            ("records", &self.records),
        ] {
            if let Some(path) = path {
                let resolved = resolve_path(path, workspace_root);
                if !resolved.is_file() {
                    errors.push(ValidationError::Tree(format!(
                        "{} file not found: {}",
                        label,
                        resolved.display()
                    )));
                }
            }
        }

        if !matches!(
            self.logging.level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            errors.push(ValidationError::Logging(format!(
                "invalid level '{}'",
                self.logging.level
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Local storage described by `storages`.
    pub fn storage(&self, workspace_root: &Path) -> Result<LocalStorage, ApiError> {
        LocalStorage::from_mounts(&self.storages, workspace_root)
    }

    /// Records from the configured file, or none.
    pub fn records(&self, workspace_root: &Path) -> Result<InMemoryRecords, ApiError> {
        match &self.records {
            Some(path) => Ok(InMemoryRecords::from_toml_file(&resolve_path(
                path,
                workspace_root,
            ))?),
            None => Ok(InMemoryRecords::new()),
        }
    }
}

/// Loads [`UpfoldConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, workspace files, environment.
    pub fn load(workspace_root: &Path) -> Result<UpfoldConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder
            .add_source(Environment::with_prefix("UPFOLD").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Defaults plus a single explicit file, then environment.
    pub fn load_from_file(path: &Path) -> Result<UpfoldConfig, ApiError> {
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path))
            .add_source(Environment::with_prefix("UPFOLD").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
