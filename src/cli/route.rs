//! CLI route: single route table and run context. Dispatches to the upload
//! folder service and presentation.

use crate::api::UploadFolderService;
use crate::config::{ConfigLoader, UpfoldConfig};
use crate::error::ApiError;
use crate::expand::{slugify, Clock};
use crate::types::{CombinedIdentifier, FolderHandle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::cli::command_name;
use crate::cli::parse::{Commands, ContextArgs};
use crate::cli::presentation::{
    format_explain_json, format_explain_text, format_info_json, format_info_script,
    format_info_text,
};

/// Runtime context for CLI execution: the configured service.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    service: UploadFolderService,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::from_config(&config, workspace_root)
    }

    /// Validate `config` and wire storage, records and trees into a service.
    pub fn from_config(config: &UpfoldConfig, workspace_root: PathBuf) -> Result<Self, ApiError> {
        if let Err(errors) = config.validate(&workspace_root) {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(ApiError::ConfigError(messages.join("; ")));
        }

        let trees = config.trees.load(&workspace_root)?;
        let storage = config.storage(&workspace_root)?;
        let records = config.records(&workspace_root)?;
        debug!(
            workspace = %workspace_root.display(),
            storages = config.storages.len(),
            "Upload folder service configured"
        );

        let service = UploadFolderService::new(Arc::new(trees), Arc::new(storage))
            .with_records(Arc::new(records));
        Ok(Self { service })
    }

    /// Replace the clock used for date tokens.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.service = self.service.with_clock(clock);
        self
    }

    pub fn service(&self) -> &UploadFolderService {
        &self.service
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Resolve { context } => self.service.resolve_path(&context.to_context()),
            Commands::Explain { context, format } => {
                let attempts = self.service.explain(&context.to_context())?;
                match format.as_str() {
                    "json" => format_explain_json(&attempts),
                    "text" => Ok(format_explain_text(&attempts)),
                    other => Err(invalid_format(other, "text, json")),
                }
            }
            Commands::Ensure { context, default } => self.handle_ensure(context, default.as_deref()),
            Commands::Info { context, format } => {
                let context = context.to_context();
                let resolved = self.service.resolve_path(&context)?;
                let info = self.service.folder_info(&context, &resolved);
                match format.as_str() {
                    "json" => format_info_json(info.as_ref()),
                    "script" => format_info_script(info.as_ref()),
                    "text" => Ok(format_info_text(info.as_ref())),
                    other => Err(invalid_format(other, "text, json, script")),
                }
            }
            Commands::Slugify { text } => Ok(slugify(text)),
        }
    }

    /// With a default folder, failures fall back to it. Without one, errors
    /// are reported and an unconfigured record is an error.
    fn handle_ensure(
        &self,
        context: &ContextArgs,
        default: Option<&str>,
    ) -> Result<String, ApiError> {
        let context = context.to_context();
        if let Some(default) = default {
            let default = FolderHandle::new(CombinedIdentifier::parse(default)?);
            let folder = self
                .service
                .resolve_and_ensure_upload_folder(&context, default);
            return Ok(folder.to_string());
        }

        let resolved = self.service.resolve_path(&context)?;
        match self.service.ensure_folder(&resolved, None)? {
            Some(folder) => Ok(folder.to_string()),
            None if resolved.trim().is_empty() => Err(ApiError::ConfigError(
                "No upload folder configured for this record".to_string(),
            )),
            None => Err(ApiError::ConfigError(format!(
                "'{}' is relative to the default folder; pass --default",
                resolved
            ))),
        }
    }
}

fn invalid_format(format: &str, allowed: &str) -> ApiError {
    ApiError::Output(format!("Unknown format '{}' (expected {})", format, allowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::FixedClock;
    use crate::store::LocalMount;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn context_args(table: &str, field: &str) -> ContextArgs {
        ContextArgs {
            table: Some(table.to_string()),
            field: Some(field.to_string()),
            container: 7,
        }
    }

    fn run_context(temp_dir: &TempDir) -> RunContext {
        let root = temp_dir.path().to_path_buf();
        std::fs::create_dir_all(root.join("fileadmin/user_upload")).unwrap();
        std::fs::write(
            root.join("page.tsconfig"),
            "default_upload_folders {\n  tt_content.image = 1:/content/{Y}\n  tt_content.image.dateformat = 1\n  tx_news = news\n}\n",
        )
        .unwrap();

        let mut config = UpfoldConfig::default();
        config.trees.installation = Some(PathBuf::from("page.tsconfig"));
        config
            .storages
            .insert("1".to_string(), LocalMount::new("fileadmin", "fileadmin"));

        RunContext::from_config(&config, root)
            .unwrap()
            .with_clock(Arc::new(FixedClock(
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            )))
    }

    #[test]
    fn test_resolve_and_ensure() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = run_context(&temp_dir);

        let resolved = ctx
            .execute(&Commands::Resolve {
                context: context_args("tt_content", "image"),
            })
            .unwrap();
        assert_eq!(resolved, "1:/content/2024");

        let ensured = ctx
            .execute(&Commands::Ensure {
                context: context_args("tt_content", "image"),
                default: None,
            })
            .unwrap();
        assert_eq!(ensured, "1:/content/2024");
        assert!(temp_dir.path().join("fileadmin/content/2024").is_dir());
    }

    #[test]
    fn test_ensure_relative_needs_default() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = run_context(&temp_dir);

        let err = ctx
            .execute(&Commands::Ensure {
                context: context_args("tx_news", "media"),
                default: None,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(_)));

        let kept = ctx
            .execute(&Commands::Ensure {
                context: context_args("tx_news", "media"),
                default: Some("1:/user_upload".to_string()),
            })
            .unwrap();
        assert_eq!(kept, "1:/user_upload");
    }

    #[test]
    fn test_info_and_explain_formats() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = run_context(&temp_dir);

        let json = ctx
            .execute(&Commands::Info {
                context: context_args("tt_content", "image"),
                format: "json".to_string(),
            })
            .unwrap();
        assert!(json.contains("fileadmin/content/2024"));

        let err = ctx
            .execute(&Commands::Explain {
                context: context_args("tt_content", "image"),
                format: "yaml".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Output(_)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = UpfoldConfig::default();
        config.trees.actor = Some(PathBuf::from("missing.toml"));
        let err = RunContext::from_config(&config, temp_dir.path().to_path_buf())
            .err()
            .unwrap();
        assert!(err.to_string().contains("actor file not found"));
    }

    #[test]
    fn test_slugify_command() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = run_context(&temp_dir);
        let out = ctx
            .execute(&Commands::Slugify {
                text: "Sommerfest 2024!".to_string(),
            })
            .unwrap();
        assert_eq!(out, "sommerfest-2024");
    }
}
