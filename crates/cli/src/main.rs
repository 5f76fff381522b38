mod config_commands;
mod relay_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    courier_config::CourierConfig,
    courier_relay::RelayMode,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "courier", about = "Courier: relay a Discord channel into Telegram", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ./courier.toml, then ~/.config/courier/).
    #[arg(long, global = true, env = "COURIER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind the HTTP server to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Relay mode: immediate, queued or poll (overrides config value).
    #[arg(long, global = true)]
    mode: Option<RelayMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bridge (default when no subcommand is provided).
    Run,
    /// Validate the configuration and report errors/warnings.
    Check,
    /// Write a documented config template.
    Init {
        /// Destination (default: ./courier.toml).
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Command-line values beat both the config file and the environment.
    fn apply_overrides(&self, config: &mut CourierConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind.clone_from(bind);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(mode) = self.mode {
            config.relay.mode = mode;
        }
    }
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match &cli.command {
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "courier starting");
            let mut loaded = courier_config::load(cli.config.as_deref())?;
            cli.apply_overrides(&mut loaded.config);
            if let Some(path) = &loaded.path {
                info!(path = %path.display(), "config loaded");
            }
            relay_commands::run(loaded.config).await
        },
        Some(Commands::Check) => config_commands::check(&cli),
        Some(Commands::Init { path }) => config_commands::init(path.as_deref()),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_loaded_config() {
        let cli = Cli::try_parse_from([
            "courier", "--bind", "127.0.0.1", "--port", "9090", "--mode", "queued", "run",
        ])
        .unwrap();
        let mut config = CourierConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.relay.mode, RelayMode::Queued);
        assert!(matches!(cli.command, Some(Commands::Run)));
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let cli = Cli::try_parse_from(["courier"]).unwrap();
        let mut config = CourierConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.server.port, courier_config::schema::DEFAULT_PORT);
        assert_eq!(config.relay.mode, RelayMode::Immediate);
        assert!(cli.command.is_none());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["courier", "--mode", "carrier-pigeon"]).is_err());
    }
}
