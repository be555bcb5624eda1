//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string used in log events (e.g. "resolve", "ensure").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Resolve { .. } => "resolve",
        Commands::Explain { .. } => "explain",
        Commands::Ensure { .. } => "ensure",
        Commands::Info { .. } => "info",
        Commands::Slugify { .. } => "slugify",
    }
}
