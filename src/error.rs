//! Error types for upload folder resolution and materialization.

use std::path::PathBuf;
use thiserror::Error;

/// Combined folder identifier validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Missing storage separator ':' in folder identifier: {0}")]
    MissingSeparator(String),

    #[error("Invalid storage id '{id}' in folder identifier: {identifier}")]
    InvalidStorageId { id: String, identifier: String },

    #[error("Empty path segment in folder identifier: {0}")]
    EmptySegment(String),
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Folder does not exist: {0}")]
    FolderNotFound(String),

    #[error("Access denied to folder: {0}")]
    AccessDenied(String),

    #[error("Storage not found: {0}")]
    StorageNotFound(u32),

    #[error("Storage {0} is offline")]
    Offline(u32),

    #[error("Folder creation rejected for {target}: {reason}")]
    CreationFailed { target: String, reason: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration tree and file loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML configuration tree: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TSconfig syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Unsupported configuration value at '{key}': {kind}")]
    UnsupportedValue { key: String, kind: String },
}

/// Folder materialization errors
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Top-level errors for the service, configuration loading and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid folder identifier: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Record lookup failed: {0}")]
    RecordLookup(String),

    #[error("Info delivery failed: {0}")]
    InfoDelivery(String),

    #[error("Failed to format output: {0}")]
    Output(String),
}

impl From<MaterializeError> for ApiError {
    fn from(err: MaterializeError) -> Self {
        match err {
            MaterializeError::Identifier(e) => ApiError::Identifier(e),
            MaterializeError::Storage(e) => ApiError::StorageError(e),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
