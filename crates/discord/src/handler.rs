//! Discord event handler for serenity.
//!
//! Forwards messages from the configured source channel into the relay.

use std::sync::{Arc, OnceLock};

use {
    serenity::{
        all::{Context, EventHandler, GatewayIntents, Message, Ready},
        async_trait,
    },
    tracing::{debug, info},
};

use courier_relay::{Attachment, InboundEvent, Relay};

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    source_channel_id: u64,
    relay: Arc<Relay>,
    bot_user_id: OnceLock<u64>,
}

impl DiscordHandler {
    pub fn new(source_channel_id: u64, relay: Arc<Relay>) -> Self {
        Self {
            source_channel_id,
            relay,
            bot_user_id: OnceLock::new(),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }
}

/// Whether a message should be relayed: it comes from the source channel and
/// was not written by the bot itself. Other bots are relayed.
pub fn should_relay(
    author_id: u64,
    bot_user_id: Option<u64>,
    channel_id: u64,
    source_channel_id: u64,
) -> bool {
    channel_id == source_channel_id && bot_user_id != Some(author_id)
}

/// Adapt a serenity message into a relay event.
pub fn inbound_event(msg: &Message) -> InboundEvent {
    build_event(
        &msg.author.name,
        &msg.content,
        msg.attachments
            .iter()
            .map(|a| (a.url.as_str(), a.content_type.as_deref(), a.filename.as_str())),
    )
}

fn build_event<'a>(
    author: &str,
    content: &str,
    attachments: impl IntoIterator<Item = (&'a str, Option<&'a str>, &'a str)>,
) -> InboundEvent {
    attachments
        .into_iter()
        .fold(InboundEvent::new(author, content), |event, (url, mime, filename)| {
            let mut attachment = Attachment::new(url, mime);
            if !filename.is_empty() {
                attachment.filename = filename.to_string();
            }
            event.with_attachment(attachment)
        })
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            channel_id = self.source_channel_id,
            "discord bot ready"
        );
        // Reconnects report the same user; the first id wins.
        let _ = self.bot_user_id.set(ready.user.id.get());
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if !should_relay(
            msg.author.id.get(),
            self.bot_user_id.get().copied(),
            msg.channel_id.get(),
            self.source_channel_id,
        ) {
            return;
        }

        let event = inbound_event(&msg);
        let outcome = self.relay.handle_event(&event).await;
        debug!(
            message_id = msg.id.get(),
            author = %event.author,
            attachments = event.attachments.len(),
            sent = outcome.sent,
            failed = outcome.failed,
            queued = outcome.queued,
            "discord message relayed"
        );
    }
}
