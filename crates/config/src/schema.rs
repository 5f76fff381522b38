/// Config schema: the two chat platforms, relay behaviour, HTTP server.
use {
    courier_relay::RelayMode,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub discord: DiscordConfig,
    pub telegram: TelegramConfig,
    pub relay: RelayConfig,
    pub server: ServerConfig,
}

/// Source side: the Discord bot and the one channel it listens to.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Channel whose messages are relayed. `0` means unset.
    pub channel_id: u64,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            channel_id: 0,
        }
    }
}

/// Target side: the Telegram bot and the chat it posts into.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Numeric chat id (`-100…`) or public `@channelname`.
    pub chat_id: String,

    /// Alternative Bot API base URL (self-hosted server).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            chat_id: String::new(),
            api_url: None,
        }
    }
}

/// How messages travel from one side to the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    pub mode: RelayMode,

    /// Seconds between periodic flushes in queued mode.
    pub flush_interval_secs: u64,

    /// Run the periodic flush in queued mode. When off, only the HTTP
    /// flush endpoint drains the queue.
    pub periodic_flush: bool,

    /// Seconds between history polls in poll mode.
    pub poll_interval_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: RelayMode::default(),
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL_SECS,
            periodic_flush: true,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Liveness / flush HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = CourierConfig::default();
        assert_eq!(cfg.relay.mode, RelayMode::Immediate);
        assert_eq!(cfg.relay.flush_interval_secs, 300);
        assert!(cfg.relay.periodic_flush);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.discord.channel_id, 0);
        assert!(cfg.telegram.token.expose_secret().is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let cfg: CourierConfig = toml::from_str(
            r#"
            [discord]
            token = "discord-token"
            channel_id = 1234567890123456789

            [relay]
            mode = "queued"
            flush_interval_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.discord.token.expose_secret(), "discord-token");
        assert_eq!(cfg.discord.channel_id, 1_234_567_890_123_456_789);
        assert_eq!(cfg.relay.mode, RelayMode::Queued);
        assert_eq!(cfg.relay.flush_interval_secs, 60);
        // untouched sections keep their defaults
        assert!(cfg.relay.periodic_flush);
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn debug_redacts_tokens() {
        let cfg = CourierConfig {
            telegram: TelegramConfig {
                token: Secret::new("123:SECRET".into()),
                chat_id: "@news".into(),
                api_url: None,
            },
            ..Default::default()
        };
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("@news"));
    }

    #[test]
    fn serialize_roundtrip_keeps_secrets() {
        let mut cfg = CourierConfig::default();
        cfg.discord.token = Secret::new("tok".into());
        let json = serde_json::to_string(&cfg).unwrap();
        let back: CourierConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.discord.token.expose_secret(), "tok");
    }
}
