//! Documented config template written by `courier init`.

use crate::schema::{DEFAULT_FLUSH_INTERVAL_SECS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PORT};

/// Generate the default config template.
pub fn default_config_template() -> String {
    format!(
        r##"# Courier configuration
# =====================
# Relays messages from one Discord channel into one Telegram chat.
#
# Environment variable substitution is supported: ${{ENV_VAR}} or
# ${{ENV_VAR:-fallback}}. The variables below also override these values
# directly: DISCORD_TOKEN, DISCORD_CHANNEL_ID, TELEGRAM_TOKEN,
# TELEGRAM_CHANNEL, TELEGRAM_API_URL, PORT, RELAY_MODE, FLUSH_INTERVAL,
# POLL_INTERVAL.

[discord]
token = "${{DISCORD_TOKEN}}"          # Bot token (needs the Message Content intent)
channel_id = 0                        # Source channel id (Developer Mode → Copy ID)

[telegram]
token = "${{TELEGRAM_TOKEN}}"         # Bot token from @BotFather
chat_id = "${{TELEGRAM_CHANNEL}}"     # "-100…" numeric id or "@channelname"
# api_url = "http://localhost:8081"   # Self-hosted Bot API server

[relay]
mode = "immediate"                    # "immediate", "queued" or "poll"
flush_interval_secs = {DEFAULT_FLUSH_INTERVAL_SECS}             # queued: seconds between periodic flushes
periodic_flush = true                 # queued: false = only POST /flush drains the queue
poll_interval_secs = {DEFAULT_POLL_INTERVAL_SECS}              # poll: seconds between history reads

[server]
bind = "0.0.0.0"                      # Liveness + flush endpoint
port = {DEFAULT_PORT}
"##
    )
}
