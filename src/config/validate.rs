//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use reqwest::Url;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
///
/// Expects a normalized config (see [`Config::normalized`]).
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.discord.token.is_empty() {
        return Err(ConfigError::MissingField {
            field: "DISCORD_TOKEN".to_string(),
        });
    }

    let mut errors = Vec::new();

    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("DISCORD_TOKEN has not been configured (still using placeholder)".to_string());
    }

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "API_BASE_URL must use http or https (got '{}')",
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "API_BASE_URL '{}' is not a valid URL: {}",
            config.api.base_url, e
        )),
    }

    if config.api.timeout_secs == 0 {
        errors.push("API timeout must be non-zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
