use std::sync::Arc;

use cadence::config::Config;
use cadence::events::Handler;
use cadence::registry::{Registry, RegistryOptions};
use cadence::{Data, Error, commands};
use dotenv::dotenv;
use serenity::all::{Client, GatewayIntents};
use songbird::SerenityInit;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();

    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cadence=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    let config = Config::from_env()?;

    let registry = Arc::new(Registry::new(
        RegistryOptions::new(config.prefix.clone(), config.command_timeout),
        Arc::new(Data::new()),
    ));
    for command in commands::all() {
        registry.add(command).await;
    }

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler::new(registry, config.node.clone());
    let shard_manager_slot = handler.shard_manager_slot();

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird()
        .await?;

    let shard_manager = client.shard_manager.clone();
    if shard_manager_slot.set(shard_manager.clone()).is_err() {
        warn!("Shard manager was already set");
    }

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Shutting down all shards");
        shard_manager.shutdown_all().await;
    });

    client.start().await.map_err(Into::into)
}
