//! CLI parse: clap types for upfold. No behavior; definitions only.

use crate::types::ResolutionContext;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Upfold CLI - default upload folder resolution
#[derive(Parser)]
#[command(name = "upfold")]
#[command(about = "Resolve, explain and create configured default upload folders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Record being edited: table, upload field and the container it lives in.
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Table of the record being edited
    #[arg(long)]
    pub table: Option<String>,

    /// Upload field of the record
    #[arg(long)]
    pub field: Option<String>,

    /// Id of the container (page) holding the record
    #[arg(long, default_value = "0")]
    pub container: u64,
}

impl ContextArgs {
    pub fn to_context(&self) -> ResolutionContext {
        ResolutionContext::new(self.table.as_deref(), self.field.as_deref(), self.container)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the configured upload folder path for a record
    Resolve {
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Show every configuration lookup made while resolving
    Explain {
        #[command(flatten)]
        context: ContextArgs,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve and create the upload folder, printing its identifier
    Ensure {
        #[command(flatten)]
        context: ContextArgs,
        /// Current default folder (e.g. "1:/user_upload"); failures fall back to it
        #[arg(long)]
        default: Option<String>,
    },
    /// Print the display info for the resolved folder
    Info {
        #[command(flatten)]
        context: ContextArgs,
        /// Output format (text, json or script)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Turn text into a lowercase, hyphen separated folder name
    Slugify {
        /// Text to convert
        text: String,
    },
}
