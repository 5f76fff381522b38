//! Channel history as an [`EventSource`] for the poller.

use std::{future::Future, sync::Arc};

use {
    async_trait::async_trait,
    serenity::all::{ChannelId, GetMessages, Http, Message, MessageId},
    tracing::debug,
};

use courier_relay::{Error, EventId, EventSource, Result, SourceEvent};

use crate::handler::{inbound_event, should_relay};

/// Discord's per-request cap for channel history.
const PAGE_LIMIT: u8 = 100;

/// Reads the source channel's history over the REST API.
pub struct DiscordHistorySource {
    http: Arc<Http>,
    channel_id: ChannelId,
    bot_user_id: u64,
}

impl DiscordHistorySource {
    pub fn new(http: Arc<Http>, channel_id: u64, bot_user_id: u64) -> Self {
        Self {
            http,
            channel_id: ChannelId::new(channel_id),
            bot_user_id,
        }
    }

    /// Resolve the bot's own user id with the token, then build the source.
    pub async fn connect(token: &str, channel_id: u64) -> crate::Result<Self> {
        if channel_id == 0 {
            return Err(crate::Error::config("channel_id must be non-zero"));
        }
        let http = Arc::new(Http::new(token));
        let me = http.get_current_user().await?;
        debug!(bot_name = %me.name, channel_id, "discord history source ready");
        Ok(Self::new(http, channel_id, me.id.get()))
    }

    async fn page_after(&self, after: EventId) -> Result<Vec<Message>> {
        let builder = GetMessages::new()
            .after(MessageId::new(after.max(1)))
            .limit(PAGE_LIMIT);
        self.channel_id
            .messages(&self.http, builder)
            .await
            .map_err(|e| Error::external("discord history", e))
    }
}

#[async_trait]
impl EventSource for DiscordHistorySource {
    async fn latest_id(&self) -> Result<Option<EventId>> {
        let newest = self
            .channel_id
            .messages(&self.http, GetMessages::new().limit(1))
            .await
            .map_err(|e| Error::external("discord history", e))?;
        Ok(newest.first().map(|m| m.id.get()))
    }

    async fn events_after(&self, after: Option<EventId>) -> Result<Vec<SourceEvent>> {
        let messages = page_forward(after.unwrap_or(0), |id| self.page_after(id)).await?;
        let channel_id = self.channel_id.get();
        Ok(messages
            .iter()
            .filter(|m| {
                should_relay(
                    m.author.id.get(),
                    Some(self.bot_user_id),
                    channel_id,
                    channel_id,
                )
            })
            .map(|m| SourceEvent {
                id: m.id.get(),
                event: inbound_event(m),
            })
            .collect())
    }
}

/// Something with a snowflake id.
trait Snowflake {
    fn snowflake(&self) -> u64;
}

impl Snowflake for Message {
    fn snowflake(&self) -> u64 {
        self.id.get()
    }
}

/// Walk history forward from `start`, one page at a time, until a short
/// page comes back. Returns every item oldest first.
async fn page_forward<T, F, Fut>(start: u64, mut fetch_after: F) -> Result<Vec<T>>
where
    T: Snowflake,
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut cursor = start;
    let mut collected = Vec::new();
    loop {
        let page = fetch_after(cursor).await?;
        let full = page.len() >= usize::from(PAGE_LIMIT);
        let Some(newest) = page.iter().map(Snowflake::snowflake).max() else {
            break;
        };
        collected.extend(page);
        if !full || newest <= cursor {
            break;
        }
        cursor = newest;
    }
    collected.sort_by_key(Snowflake::snowflake);
    Ok(collected)
}
