//! Discord side of courier.
//!
//! Receives channel messages through serenity's gateway client, adapts them
//! into [`courier_relay::InboundEvent`]s, downloads attachments over HTTP and
//! exposes channel history for the poller.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod handler;
pub mod source;

pub use {
    client::run_gateway,
    error::{Error, Result},
    fetcher::{DEFAULT_FETCH_TIMEOUT, HttpAttachmentFetcher},
    handler::{DiscordHandler, inbound_event, should_relay},
    source::DiscordHistorySource,
};
