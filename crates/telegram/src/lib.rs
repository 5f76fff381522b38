//! Telegram delivery for courier.
//!
//! Implements [`courier_relay::DeliverySink`] over the Telegram Bot API using
//! teloxide: `sendMessage` and `sendPhoto`, both with HTML parse mode.

pub mod error;
pub mod outbound;

pub use {
    error::{Error, Result},
    outbound::{TelegramSink, parse_recipient},
};
