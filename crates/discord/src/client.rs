use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    serenity::Client,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use {courier_config::DiscordConfig, courier_relay::Relay};

use crate::{
    error::{Error, Result},
    handler::DiscordHandler,
};

/// Connect to the Discord gateway and relay source-channel messages until
/// `cancel` fires or the connection ends.
pub async fn run_gateway(
    config: &DiscordConfig,
    relay: Arc<Relay>,
    cancel: CancellationToken,
) -> Result<()> {
    if config.channel_id == 0 {
        return Err(Error::config("channel_id must be non-zero"));
    }

    let handler = DiscordHandler::new(config.channel_id, relay);
    let mut client = Client::builder(config.token.expose_secret(), DiscordHandler::intents())
        .event_handler(handler)
        .await?;

    let shard_manager = Arc::clone(&client.shard_manager);
    let shutdown = cancel.child_token();
    let watcher = shutdown.clone();
    tokio::spawn(async move {
        watcher.cancelled().await;
        info!("shutting down discord gateway");
        shard_manager.shutdown_all().await;
    });

    info!(channel_id = config.channel_id, "connecting to discord gateway");
    let result = client.start().await;
    if let Err(e) = &result {
        warn!(error = %e, "discord gateway stopped");
    }
    // Release the shutdown watcher when the client exits on its own.
    shutdown.cancel();
    result.map_err(Error::from)
}
