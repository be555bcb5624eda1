//! Merge rules: built-in defaults sit below every file and environment layer.
//!
//! Maps (`storages`, `logging.modules`) merge key by key, so a workspace file
//! can override one storage without repeating the others.

use crate::logging::LoggingConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder seeded with the logging defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let logging = LoggingConfig::default();
    Config::builder()
        .set_default("logging.enabled", logging.enabled)?
        .set_default("logging.level", logging.level)?
        .set_default("logging.format", logging.format)?
        .set_default("logging.output", logging.output)?
        .set_default("logging.color", logging.color)
}
