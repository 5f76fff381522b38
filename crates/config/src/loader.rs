use std::path::{Path, PathBuf};

use {secrecy::Secret, tracing::debug};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::CourierConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "courier.toml",
    "courier.yaml",
    "courier.yml",
    "courier.json",
];

/// Environment variables that override file values.
pub const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const ENV_DISCORD_CHANNEL_ID: &str = "DISCORD_CHANNEL_ID";
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_TELEGRAM_CHANNEL: &str = "TELEGRAM_CHANNEL";
pub const ENV_TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
pub const ENV_PORT: &str = "PORT";
pub const ENV_RELAY_MODE: &str = "RELAY_MODE";
pub const ENV_FLUSH_INTERVAL: &str = "FLUSH_INTERVAL";
pub const ENV_POLL_INTERVAL: &str = "POLL_INTERVAL";

/// A loaded config and the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CourierConfig,
    pub path: Option<PathBuf>,
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<CourierConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, standard locations are
/// searched and defaults are used when nothing is found. Environment
/// overrides are applied last in both cases.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let mut config = match &path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(path)?
        },
        None => {
            debug!("no config file found, using defaults and environment");
            CourierConfig::default()
        },
    };

    apply_env_overrides(&mut config)?;
    Ok(LoadedConfig { config, path })
}

/// Find the first config file in standard locations.
///
/// Search order:
/// 1. `./courier.{toml,yaml,yml,json}`
/// 2. `~/.config/courier/courier.{toml,yaml,yml,json}`
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/courier/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "courier").map(|d| d.config_dir().to_path_buf())
}

/// Write `contents` to `path` unless a file is already there.
///
/// Creates parent directories if needed. Returns `false` when the file
/// already existed and was left untouched.
pub fn write_new_config(path: &Path, contents: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    debug!(path = %path.display(), "wrote config");
    Ok(true)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut CourierConfig) -> Result<()> {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

/// Apply overrides resolved through `lookup`. Empty values are ignored.
pub fn apply_env_overrides_with(
    config: &mut CourierConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(token) = get(ENV_DISCORD_TOKEN) {
        config.discord.token = Secret::new(token);
    }
    if let Some(raw) = get(ENV_DISCORD_CHANNEL_ID) {
        config.discord.channel_id = raw
            .parse()
            .map_err(|e| Error::invalid_env(ENV_DISCORD_CHANNEL_ID, e))?;
    }
    if let Some(token) = get(ENV_TELEGRAM_TOKEN) {
        config.telegram.token = Secret::new(token);
    }
    if let Some(chat_id) = get(ENV_TELEGRAM_CHANNEL) {
        config.telegram.chat_id = chat_id;
    }
    if let Some(url) = get(ENV_TELEGRAM_API_URL) {
        config.telegram.api_url = Some(url);
    }
    if let Some(raw) = get(ENV_PORT) {
        config.server.port = raw.parse().map_err(|e| Error::invalid_env(ENV_PORT, e))?;
    }
    if let Some(raw) = get(ENV_RELAY_MODE) {
        config.relay.mode = raw
            .parse()
            .map_err(|e| Error::invalid_env(ENV_RELAY_MODE, e))?;
    }
    if let Some(raw) = get(ENV_FLUSH_INTERVAL) {
        config.relay.flush_interval_secs = raw
            .parse()
            .map_err(|e| Error::invalid_env(ENV_FLUSH_INTERVAL, e))?;
    }
    if let Some(raw) = get(ENV_POLL_INTERVAL) {
        config.relay.poll_interval_secs = raw
            .parse()
            .map_err(|e| Error::invalid_env(ENV_POLL_INTERVAL, e))?;
    }
    Ok(())
}

fn parse_config(raw: &str, path: &Path) -> Result<CourierConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        other => Err(Error::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}
