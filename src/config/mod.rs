//! Configuration parsing and types.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

use std::path::Path;

use tracing::{debug, info};

use crate::common::error::ConfigError;

pub use parser::load_config;
pub use types::*;
pub use validate::validate_config;

/// Load the configuration: defaults, then the HOCON file if it exists,
/// then environment overrides. The result is normalized and validated.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let config = if path.exists() {
        info!("Loading configuration from {}...", path.display());
        load_config(path)?
    } else {
        debug!("No config file at {}, using defaults and environment", path.display());
        Config::default()
    };

    let config = env::apply_env_overrides(config).normalized();
    validate_config(&config)?;
    Ok(config)
}
