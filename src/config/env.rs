//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `DISCORD_TOKEN` - Discord bot token
//! - `API_BASE_URL` - Root URL of the review REST API
//! - `ALLOWED_CHANNEL` - Channel name the bot listens in (empty = all)
//! - `API_TIMEOUT_SECS` - Upper bound on a single API call

use std::env;

use crate::config::types::Config;

/// Environment variable pointing at an optional HOCON config file.
const CONFIG_PATH_VAR: &str = "AVIS_BOT_CONFIG";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| env::var(key).ok())
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Set-but-empty values do override: an empty `ALLOWED_CHANNEL` is how the
/// channel filter gets disabled.
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("DISCORD_TOKEN") {
        config.discord.token = token;
    }
    if let Some(channel) = lookup("ALLOWED_CHANNEL") {
        config.discord.allowed_channel = channel;
    }

    if let Some(base_url) = lookup("API_BASE_URL") {
        config.api.base_url = base_url;
    }
    if let Some(timeout) = lookup("API_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.trim().parse() {
            config.api.timeout_secs = secs;
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `AVIS_BOT_CONFIG`, otherwise returns "avis-bot.conf".
pub fn get_config_path() -> String {
    env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "avis-bot.conf".to_string())
}
