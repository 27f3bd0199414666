//! Discord bot client abstraction.
//!
//! Provides a high-level interface for creating and running the Discord bot,
//! hiding serenity implementation details from the rest of the application.

use std::sync::Arc;

use serenity::prelude::*;
use serenity::Client;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::Config;
use crate::discord::handler::ReviewHandler;
use crate::review::{CommandParser, ReviewApi};

/// Builder for creating the Discord bot.
pub struct DiscordBotBuilder {
    config: Arc<Config>,
    api: Arc<dyn ReviewApi>,
}

impl DiscordBotBuilder {
    /// Create a new Discord bot builder.
    pub fn new(config: Arc<Config>, api: Arc<dyn ReviewApi>) -> Self {
        Self { config, api }
    }

    /// Build the Discord bot.
    pub async fn build(self) -> anyhow::Result<DiscordBot> {
        // Reading `!avis` needs the privileged message content intent.
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let parser = CommandParser::new()?;
        let handler = ReviewHandler::new(self.config.clone(), parser, self.api);

        let client = Client::builder(&self.config.discord.token, intents)
            .event_handler(handler)
            .await?;

        Ok(DiscordBot { client })
    }
}

pub struct DiscordBot {
    client: Client,
}

impl DiscordBot {
    /// Run until the gateway connection ends or `shutdown_rx` flips to `true`.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> anyhow::Result<()> {
        let shard_manager = self.client.shard_manager.clone();

        info!("Connecting to Discord...");
        tokio::select! {
            result = self.client.start() => {
                if let Err(e) = result {
                    error!("Discord client error: {}", e);
                    return Err(e.into());
                }
                info!("Discord client disconnected normally");
            }
            _ = async {
                // Wait for shutdown signal
                while shutdown_rx.changed().await.is_ok() {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            } => {
                info!("Initiating graceful Discord shutdown...");
                shard_manager.shutdown_all().await;
                info!("Discord shutdown complete");
            }
        }

        Ok(())
    }
}
