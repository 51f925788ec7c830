use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::prelude::*;
use std::sync::Arc;

use nudge::core::{Clock, Config, SystemClock};
use nudge::discord::{DiscordChannels, Handler};
use nudge::features::get_bot_version;
use nudge::features::watchdog::{mailbox, seed_tracker, spawn_ticker, Watchdog};
use nudge::health;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting channel watchdog v{}...", get_bot_version());
    info!(
        "📄 Watching {} channels from {}",
        config.channels.len(),
        config.channels_path
    );
    info!("🔔 Firing policy: {}", config.policy.describe());

    // Keep-alive endpoint for hosts that sleep idle web services
    if let Some(port) = config.http_port {
        tokio::spawn(async move {
            if let Err(e) = health::start_server(port).await {
                warn!("Health server stopped: {e}. Liveness pings will fail.");
            }
        });
    }

    let (handle, mailbox) = mailbox();
    let handler = Handler::new(handle.clone(), config.status_command.clone());

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    // Seed over REST before the gateway starts delivering messages
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let channels = DiscordChannels::new(client.cache_and_http.http.clone());
    let tracker = seed_tracker(&config.channels, &channels, clock.as_ref()).await;

    let watchdog = Watchdog::new(
        config.channels.clone(),
        tracker,
        config.policy,
        config.display_offset,
        Arc::new(channels),
        clock,
        mailbox,
    );
    tokio::spawn(watchdog.run());
    spawn_ticker(handle, config.tick_interval);

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Missing MESSAGE_CONTENT intent in the Developer Portal");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
