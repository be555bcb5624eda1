//! Workspace config sources, lowest precedence first:
//! `upfold.toml` at the workspace root, `config/config.toml`, then
//! `config/{UPFOLD_ENV}.toml` when `UPFOLD_ENV` is set.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Existing workspace config files in the order they are layered.
pub fn workspace_config_files(workspace_root: &Path) -> Vec<PathBuf> {
    let config_dir = workspace_root.join("config");
    let mut candidates = vec![
        workspace_root.join("upfold.toml"),
        config_dir.join("config.toml"),
    ];
    if let Ok(env_name) = std::env::var("UPFOLD_ENV") {
        if !env_name.trim().is_empty() {
            candidates.push(config_dir.join(format!("{}.toml", env_name.trim())));
        }
    }
    candidates.into_iter().filter(|path| path.is_file()).collect()
}

/// Add workspace config files to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(workspace_config_files(workspace_root)
        .into_iter()
        .fold(builder, |builder, path| {
            debug!(config_path = %path.display(), "Layering workspace configuration");
            builder.add_source(File::from(path).required(false))
        }))
}
