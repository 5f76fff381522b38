use std::sync::Arc;

use courier_relay::{Flusher, HistoryPoller, RelayMode};

/// Shared state handed to every route.
///
/// `flusher` is present only in queued mode and `poller` only in poll mode.
#[derive(Clone)]
pub struct AppState {
    pub mode: RelayMode,
    pub flusher: Option<Arc<Flusher>>,
    pub poller: Option<Arc<HistoryPoller>>,
}

impl AppState {
    pub fn immediate() -> Self {
        Self {
            mode: RelayMode::Immediate,
            flusher: None,
            poller: None,
        }
    }

    pub fn queued(flusher: Arc<Flusher>) -> Self {
        Self {
            mode: RelayMode::Queued,
            flusher: Some(flusher),
            poller: None,
        }
    }

    pub fn polling(poller: Arc<HistoryPoller>) -> Self {
        Self {
            mode: RelayMode::Poll,
            flusher: None,
            poller: Some(poller),
        }
    }

    /// Units currently waiting for a flush.
    pub async fn pending(&self) -> usize {
        match &self.flusher {
            Some(flusher) => flusher.queue().len().await,
            None => 0,
        }
    }
}
