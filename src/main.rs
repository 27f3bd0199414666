//! Avis Bot - Discord course review collector
//!
//! Listens for `!avis CODE DIFF CHARGE [comment]` in a Discord channel and
//! forwards each review to the IFT2255 REST API (`POST /avis`).

mod common;
mod config;
mod discord;
mod review;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info};

use config::{env::get_config_path, load_and_validate};
use discord::DiscordBotBuilder;
use review::HttpReviewApi;

#[tokio::main]
async fn main() -> Result<()> {
    // Variables may also come from the real environment
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Avis Bot v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Set DISCORD_TOKEN in the environment or in a .env file.");
        e
    })?;

    let api = HttpReviewApi::from_config(&config)?;

    info!("Configuration loaded successfully");
    info!("  API endpoint: {}", api.endpoint());
    info!("  API timeout: {}s", config.api.timeout_secs);
    info!(
        "  Allowed channel: {}",
        config.channel_filter().unwrap_or("(all channels)")
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let bot = DiscordBotBuilder::new(Arc::new(config), Arc::new(api))
        .build()
        .await?;

    let mut discord_task = tokio::spawn(bot.run(shutdown_rx));

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            true
        }
        result = &mut discord_task => {
            match result {
                Ok(Ok(())) => info!("Discord task ended"),
                Ok(Err(e)) => error!("Discord task failed: {}", e),
                Err(e) => error!("Discord task panicked: {}", e),
            }
            false
        }
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (Discord task already exited): {}", e);
        }
        match tokio::time::timeout(tokio::time::Duration::from_secs(5), discord_task).await {
            Ok(Ok(Ok(()))) => info!("Discord client stopped"),
            Ok(Ok(Err(e))) => error!("Discord client error during shutdown: {}", e),
            Ok(Err(e)) => error!("Discord task panicked: {}", e),
            Err(_) => error!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
