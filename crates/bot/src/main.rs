//! Streak Keeper Discord Bot

use std::sync::Arc;

use anyhow::anyhow;
use serenity::http::Http;
use serenity::prelude::*;
use tokio::sync::watch;
use tracing::{error, info};
use tracker::{Scheduler, Tracker};

mod discord;
mod handler;

use discord::DiscordGateway;
use handler::Bot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("streak_keeper_bot=debug".parse()?)
                .add_directive("tracker=debug".parse()?)
                .add_directive("store=info".parse()?),
        )
        .init();

    info!("Starting Streak Keeper Bot");

    // Load configuration
    let mut config = common::Config::from_env()?;
    let token = config
        .discord_token
        .clone()
        .ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

    let http = Arc::new(Http::new(&token));
    if config.tracker.bot_user_id.is_none() {
        let me = http.get_current_user().await?;
        info!("Running as {} ({})", me.name, me.id);
        config.tracker.bot_user_id = Some(me.id.get().to_string());
    }

    let channel_id = config.tracker.channel_id;
    let gateway = DiscordGateway::new(http, channel_id);
    let store = store::create_store(&config.tracker.data_dir).await?;
    let tracker = Arc::new(Tracker::open(gateway, store, config.tracker.clone()).await?);

    // Daily rollover runs alongside the gateway connection
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    let scheduler = tokio::spawn(Scheduler::new(tracker.clone(), shutdown_rx).run());

    let bot = Bot {
        tracker,
        channel_id,
    };
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGE_REACTIONS;
    let mut client = Client::builder(&token, intents).event_handler(bot).await?;

    let shard_manager = client.shard_manager.clone();
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        info!("Shutting down");
        let _ = signal_tx.send(true);
        shard_manager.shutdown_all().await;
    });

    info!("Connecting to Discord...");
    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    // Let a running tick finish persisting before exit
    let _ = shutdown_tx.send(true);
    scheduler.await?;
    Ok(())
}
