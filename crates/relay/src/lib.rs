//! Relay core: turns inbound chat events into delivery units and gets them
//! to the outbound sink, either right away or through a pending queue that a
//! flush trigger (on-demand or periodic) drains.
//!
//! Platform clients live in their own crates and plug in through the
//! [`AttachmentFetcher`], [`DeliverySink`] and [`EventSource`] traits.

pub mod dispatch;
pub mod error;
pub mod event;
pub mod flush;
pub mod pipeline;
pub mod poll;
pub mod queue;
pub mod sink;
#[cfg(test)]
pub(crate) mod testing;
pub mod translate;
pub mod unit;

pub use {
    dispatch::{DispatchOutcome, DispatchPolicy, RelayMode, send_all},
    error::{Error, Result},
    event::{Attachment, AttachmentFetcher, InboundEvent},
    flush::{FlushReport, Flusher},
    pipeline::Relay,
    poll::{EventId, EventSource, HistoryPoller, PollReport, SourceEvent},
    queue::PendingQueue,
    sink::DeliverySink,
    translate::{caption, translate},
    unit::{DeliveryUnit, PhotoUnit, TextUnit},
};
