use std::{sync::Arc, time::Duration};

use {
    anyhow::{Context, Result},
    secrecy::ExposeSecret,
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
};

use {
    courier_config::{
        CourierConfig, DiscordConfig,
        validate::{self, Severity},
    },
    courier_discord::{DEFAULT_FETCH_TIMEOUT, DiscordHistorySource, HttpAttachmentFetcher},
    courier_gateway::AppState,
    courier_relay::{
        AttachmentFetcher, DeliverySink, DispatchPolicy, Flusher, HistoryPoller, PendingQueue,
        Relay, RelayMode,
    },
    courier_telegram::TelegramSink,
};

/// Start the bridge in the configured mode and serve HTTP until Ctrl-C.
pub async fn run(config: CourierConfig) -> Result<()> {
    let report = validate::check_config(&config);
    for d in report
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
    {
        warn!(path = %d.path, "{}", d.message);
    }
    if report.has_errors() {
        anyhow::bail!("invalid configuration: {}", report.error_summary());
    }

    let telegram = TelegramSink::from_config(&config.telegram)?;
    telegram
        .probe()
        .await
        .context("telegram rejected the bot token")?;
    let sink: Arc<dyn DeliverySink> = Arc::new(telegram);
    let fetcher: Arc<dyn AttachmentFetcher> = Arc::new(
        HttpAttachmentFetcher::with_timeout(DEFAULT_FETCH_TIMEOUT)
            .context("failed to build attachment http client")?,
    );

    let cancel = CancellationToken::new();
    let mut background: Vec<JoinHandle<()>> = Vec::new();

    let state = match config.relay.mode {
        RelayMode::Immediate => {
            let relay = Arc::new(Relay::new(fetcher, DispatchPolicy::immediate(sink)));
            background.push(spawn_discord(config.discord.clone(), relay, cancel.clone()));
            AppState::immediate()
        },
        RelayMode::Queued => {
            let queue = Arc::new(PendingQueue::new());
            let flusher = Arc::new(Flusher::new(Arc::clone(&queue), sink));
            if config.relay.periodic_flush {
                let interval = Duration::from_secs(config.relay.flush_interval_secs);
                background.push(flusher.spawn_periodic(interval, cancel.clone()));
            }
            let relay = Arc::new(Relay::new(fetcher, DispatchPolicy::queued(queue)));
            background.push(spawn_discord(config.discord.clone(), relay, cancel.clone()));
            AppState::queued(flusher)
        },
        RelayMode::Poll => {
            let source = DiscordHistorySource::connect(
                config.discord.token.expose_secret(),
                config.discord.channel_id,
            )
            .await
            .context("failed to open discord channel history")?;
            let poller = Arc::new(HistoryPoller::new(Arc::new(source), fetcher, sink));
            let interval = Duration::from_secs(config.relay.poll_interval_secs);
            background.push(poller.spawn(interval, cancel.clone()));
            AppState::polling(poller)
        },
    };

    info!(mode = %config.relay.mode, "relay running");

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
        ctrl_c.cancel();
    });

    let served = courier_gateway::serve(
        &config.server.bind,
        config.server.port,
        courier_gateway::build_app(state),
        cancel.clone(),
    )
    .await;

    cancel.cancel();
    for task in background {
        if let Err(e) = task.await {
            warn!(error = %e, "background task ended abnormally");
        }
    }
    info!("courier stopped");

    served.with_context(|| {
        format!(
            "http server on {}:{} failed",
            config.server.bind, config.server.port
        )
    })
}

/// Run the Discord gateway client. Losing the gateway stops the process.
fn spawn_discord(
    config: DiscordConfig,
    relay: Arc<Relay>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = courier_discord::run_gateway(&config, relay, cancel.clone()).await {
            error!(error = %e, "discord gateway failed");
        }
        cancel.cancel();
    })
}
