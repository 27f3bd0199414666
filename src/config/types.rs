//! Configuration type definitions.

use serde::Deserialize;

/// Default REST API root.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:7070";

/// Default channel the bot listens in.
pub const DEFAULT_ALLOWED_CHANNEL: &str = "avis-cours";

/// Default upper bound on a single API call, in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Root configuration structure.
///
/// Loaded once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: String,
    /// Channel name the bot answers in. Empty means every channel.
    #[serde(default = "default_allowed_channel")]
    pub allowed_channel: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            allowed_channel: default_allowed_channel(),
        }
    }
}

/// Review REST API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_allowed_channel() -> String {
    DEFAULT_ALLOWED_CHANNEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

impl Config {
    /// Trim values and strip trailing slashes from the API root.
    pub fn normalized(mut self) -> Self {
        self.discord.token = self.discord.token.trim().to_string();
        self.discord.allowed_channel = self.discord.allowed_channel.trim().to_string();
        self.api.base_url = self.api.base_url.trim().trim_end_matches('/').to_string();
        self
    }

    /// The channel filter, or `None` when every channel is accepted.
    pub fn channel_filter(&self) -> Option<&str> {
        let channel = self.discord.allowed_channel.as_str();
        (!channel.is_empty()).then_some(channel)
    }

    /// Whether a message posted in `channel_name` should be handled.
    pub fn accepts_channel(&self, channel_name: &str) -> bool {
        self.channel_filter()
            .map_or(true, |allowed| allowed == channel_name)
    }
}
