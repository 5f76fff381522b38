use {
    async_trait::async_trait,
    bytes::Bytes,
    secrecy::ExposeSecret,
    teloxide::{
        payloads::{SendMessageSetters, SendPhotoSetters},
        prelude::*,
        types::{ChatId, InputFile, ParseMode, Recipient},
    },
    tracing::{debug, info},
};

use {courier_config::TelegramConfig, courier_relay::DeliverySink};

use crate::error::{Error, Result};

/// File name attached to in-memory photo uploads.
const PHOTO_FILE_NAME: &str = "image.jpg";

/// Delivery sink posting into a single Telegram chat.
pub struct TelegramSink {
    bot: Bot,
    target: Recipient,
    label: String,
}

impl TelegramSink {
    pub fn new(bot: Bot, target: Recipient) -> Self {
        let label = match &target {
            Recipient::Id(ChatId(id)) => id.to_string(),
            Recipient::ChannelUsername(name) => name.clone(),
        };
        Self { bot, target, label }
    }

    /// Build a sink from the `[telegram]` config section.
    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        let mut bot = Bot::new(config.token.expose_secret());
        if let Some(raw) = config.api_url.as_deref() {
            let url = reqwest::Url::parse(raw)
                .map_err(|e| Error::config(format!("invalid api_url {raw:?}: {e}")))?;
            bot = bot.set_api_url(url);
        }
        let target = parse_recipient(&config.chat_id)?;
        Ok(Self::new(bot, target))
    }

    /// Human-readable chat target for logs.
    pub fn target(&self) -> &str {
        &self.label
    }

    /// Verify the bot token with `getMe`. Returns the bot username, if any.
    pub async fn probe(&self) -> Result<Option<String>> {
        let me = self.bot.get_me().await?;
        let username = me.user.username.clone();
        info!(username = ?username, chat = %self.label, "telegram bot token verified");
        Ok(username)
    }

    async fn post_text(&self, body: &str) -> Result<()> {
        self.bot
            .send_message(self.target.clone(), body)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn post_photo(&self, image: Bytes, caption: &str) -> Result<()> {
        let input = InputFile::memory(image.to_vec()).file_name(PHOTO_FILE_NAME);
        let mut req = self
            .bot
            .send_photo(self.target.clone(), input)
            .parse_mode(ParseMode::Html);
        if !caption.is_empty() {
            req = req.caption(caption);
        }
        req.await?;
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn send_text(&self, body: &str) -> courier_relay::Result<()> {
        self.post_text(body).await?;
        debug!(chat = %self.label, body_len = body.len(), "telegram text sent");
        Ok(())
    }

    async fn send_photo(&self, image: Bytes, caption: &str) -> courier_relay::Result<()> {
        let size = image.len();
        self.post_photo(image, caption).await?;
        info!(
            chat = %self.label,
            bytes = size,
            caption_len = caption.len(),
            "telegram photo sent"
        );
        Ok(())
    }
}

/// Parse a chat target: a numeric chat id or a public `@channelname`.
pub fn parse_recipient(raw: &str) -> Result<Recipient> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::config("chat_id is empty"));
    }
    if let Some(name) = raw.strip_prefix('@') {
        if name.is_empty() {
            return Err(Error::config("chat_id \"@\" has no channel name"));
        }
        return Ok(Recipient::ChannelUsername(raw.to_string()));
    }
    raw.parse::<i64>()
        .map(|id| Recipient::Id(ChatId(id)))
        .map_err(|_| Error::config(format!("chat_id {raw:?} is neither a number nor @channel")))
}
