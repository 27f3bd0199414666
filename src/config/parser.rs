//! Configuration file parsing (HOCON format).

use std::fs;
use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
///
/// Parse errors are prefixed with the file path.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;

    load_config_str(&content).map_err(|e| match e {
        ConfigError::ParseError { message } => ConfigError::ParseError {
            message: format!("{}: {}", path.display(), message),
        },
        other => other,
    })
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .and_then(|loader| loader.resolve())
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}
