//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StorageError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Identifier(_) => format!("Invalid folder identifier. {}", e),
        ApiError::StorageError(StorageError::AccessDenied(folder)) => {
            format!("Access denied to {}; no folder was created.", folder)
        }
        ApiError::ConfigError(_) => format!("{}\nCheck config/config.toml or --config.", e),
        _ => e.to_string(),
    }
}
