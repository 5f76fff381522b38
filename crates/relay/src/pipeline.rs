use std::sync::Arc;

use {tokio::sync::Mutex, tracing::debug};

use crate::{
    dispatch::{DispatchOutcome, DispatchPolicy, RelayMode},
    event::{AttachmentFetcher, InboundEvent},
    translate::translate,
};

/// Translate-then-dispatch entry point used by the inbound event handler.
pub struct Relay {
    fetcher: Arc<dyn AttachmentFetcher>,
    policy: DispatchPolicy,
    // Events are handled one at a time, so immediate-mode sends of one
    // message finish before the next message is translated.
    turn: Mutex<()>,
}

impl Relay {
    pub fn new(fetcher: Arc<dyn AttachmentFetcher>, policy: DispatchPolicy) -> Self {
        Self {
            fetcher,
            policy,
            turn: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> RelayMode {
        self.policy.mode()
    }

    pub async fn handle_event(&self, event: &InboundEvent) -> DispatchOutcome {
        let _turn = self.turn.lock().await;

        let units = translate(event, self.fetcher.as_ref()).await;
        if units.is_empty() {
            debug!(author = %event.author, "nothing to relay");
            return DispatchOutcome::default();
        }
        self.policy.dispatch(units).await
    }
}
