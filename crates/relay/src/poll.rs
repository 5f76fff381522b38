//! History polling: the alternative to queue-based batching.
//!
//! Instead of reacting to live events, the poller re-reads the source
//! channel on an interval and relays whatever arrived after the last message
//! it handled.

use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    tokio::{sync::Mutex, task::JoinHandle, time::MissedTickBehavior},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use crate::{
    dispatch::send_all,
    error::Result,
    event::{AttachmentFetcher, InboundEvent},
    sink::DeliverySink,
    translate::translate,
};

/// Monotonic identifier of a source message (Discord snowflake).
pub type EventId = u64;

/// A source message together with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEvent {
    pub id: EventId,
    pub event: InboundEvent,
}

/// Readable message history of the source channel.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Newest message currently in the channel, if any.
    async fn latest_id(&self) -> Result<Option<EventId>>;

    /// Relayable messages strictly newer than `after`, oldest first.
    async fn events_after(&self, after: Option<EventId>) -> Result<Vec<SourceEvent>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub events: usize,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct Cursor {
    seeded: bool,
    last_processed_id: Option<EventId>,
}

pub struct HistoryPoller {
    source: Arc<dyn EventSource>,
    fetcher: Arc<dyn AttachmentFetcher>,
    sink: Arc<dyn DeliverySink>,
    cursor: Mutex<Cursor>,
}

impl HistoryPoller {
    pub fn new(
        source: Arc<dyn EventSource>,
        fetcher: Arc<dyn AttachmentFetcher>,
        sink: Arc<dyn DeliverySink>,
    ) -> Self {
        Self {
            source,
            fetcher,
            sink,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// Start from a known position instead of the channel's newest message.
    #[must_use]
    pub fn starting_after(self, id: EventId) -> Self {
        Self {
            cursor: Mutex::new(Cursor {
                seeded: true,
                last_processed_id: Some(id),
            }),
            ..self
        }
    }

    pub async fn last_processed_id(&self) -> Option<EventId> {
        self.cursor.lock().await.last_processed_id
    }

    /// Run one poll round.
    ///
    /// The first round only records the newest existing message so history
    /// from before startup is not replayed. A source error leaves the cursor
    /// where it was.
    pub async fn poll_once(&self) -> Result<PollReport> {
        let mut cursor = self.cursor.lock().await;

        if !cursor.seeded {
            cursor.last_processed_id = self.source.latest_id().await?;
            cursor.seeded = true;
            info!(last_processed_id = ?cursor.last_processed_id, "poll cursor seeded");
            return Ok(PollReport::default());
        }

        let mut events = self.source.events_after(cursor.last_processed_id).await?;
        events.sort_by_key(|e| e.id);

        let mut report = PollReport::default();
        for SourceEvent { id, event } in events {
            if cursor.last_processed_id.is_some_and(|last| id <= last) {
                continue;
            }
            let units = translate(&event, self.fetcher.as_ref()).await;
            let outcome = send_all(self.sink.as_ref(), &units).await;
            report.events += 1;
            report.sent += outcome.sent;
            report.failed += outcome.failed;
            cursor.last_processed_id = Some(id);
        }

        if report.events > 0 {
            info!(
                events = report.events,
                sent = report.sent,
                failed = report.failed,
                last_processed_id = ?cursor.last_processed_id,
                "poll relayed new messages"
            );
        } else {
            debug!("poll: no new messages");
        }
        Ok(report)
    }

    /// Poll every `interval` until `cancel` fires. The first round (seeding)
    /// runs right away.
    pub fn spawn(self: &Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "history poller started");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("history poller stopped");
                        break;
                    },
                    _ = ticker.tick() => {
                        if let Err(e) = poller.poll_once().await {
                            warn!(error = %e, "history poll failed");
                        }
                    },
                }
            }
        })
    }
}
