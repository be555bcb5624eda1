//! Upfold CLI Binary
//!
//! Command-line front end for resolving and creating default upload folders.

use clap::Parser;
use std::process;
use tracing::{error, info};
use upfold::cli::{Cli, RunContext};
use upfold::config::ConfigLoader;
use upfold::logging::{init_logging, LoggingConfig};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Upfold CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", upfold::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", upfold::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Logging section of the configuration the command will run with.
fn configured_logging(cli: &Cli) -> Option<LoggingConfig> {
    let loaded = match cli.config.as_deref() {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(&cli.workspace),
    };
    loaded.ok().map(|config| config.logging)
}

/// Precedence: CLI flags, then the config file, then defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = configured_logging(cli).unwrap_or_default();

    config.enabled &= !cli.quiet;
    if cli.verbose {
        config.level = "debug".to_string();
    }
    let overrides = [
        (&mut config.level, &cli.log_level),
        (&mut config.format, &cli.log_format),
        (&mut config.output, &cli.log_output),
    ];
    for (target, flag) in overrides {
        if let Some(value) = flag {
            *target = value.clone();
        }
    }
    if cli.log_file.is_some() {
        config.file = cli.log_file.clone();
    }

    config
}
