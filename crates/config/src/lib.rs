//! Configuration loading, validation and env substitution.
//!
//! Config files: `courier.toml`, `courier.yaml`, or `courier.json`
//! Searched in `./` then `~/.config/courier/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values, and well-known
//! environment variables (`DISCORD_TOKEN`, `TELEGRAM_TOKEN`, …) override
//! file values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        LoadedConfig, apply_env_overrides, apply_env_overrides_with, config_dir, find_config_file,
        load, load_config, write_new_config,
    },
    schema::{CourierConfig, DiscordConfig, RelayConfig, ServerConfig, TelegramConfig},
    template::default_config_template,
    validate::{Diagnostic, Severity, ValidationResult, check_config, validate_toml_str},
};
