//! In-memory collaborators shared by the unit tests of this crate.

use std::{collections::HashMap, sync::Mutex};

use {async_trait::async_trait, bytes::Bytes};

use crate::{
    error::{Error, Result},
    event::{Attachment, AttachmentFetcher},
    sink::DeliverySink,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Photo { image: Vec<u8>, caption: String },
}

/// Records every call, failing the ones whose body or caption matches
/// `fail_on`.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Sent>>,
    fail_on: Option<String>,
}

impl RecordingSink {
    pub fn failing_on(body: &str) -> Self {
        Self {
            sent: Mutex::default(),
            fail_on: Some(body.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, entry: Sent, key: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
        if self.fail_on.as_deref() == Some(key) {
            return Err(Error::external(
                "recording sink",
                std::io::Error::other("rejected by test sink"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn send_text(&self, body: &str) -> Result<()> {
        self.record(Sent::Text(body.to_string()), body)
    }

    async fn send_photo(&self, image: Bytes, caption: &str) -> Result<()> {
        self.record(
            Sent::Photo {
                image: image.to_vec(),
                caption: caption.to_string(),
            },
            caption,
        )
    }
}

/// Serves attachment bytes from a fixed URL map.
#[derive(Default)]
pub struct StaticFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    #[must_use]
    pub fn with_file(mut self, url: &str, bytes: &[u8]) -> Self {
        self.files.insert(url.to_string(), bytes.to_vec());
        self
    }
}

#[async_trait]
impl AttachmentFetcher for StaticFetcher {
    async fn fetch(&self, attachment: &Attachment) -> Result<Bytes> {
        self.files
            .get(&attachment.url)
            .map(|bytes| Bytes::from(bytes.clone()))
            .ok_or_else(|| Error::fetch(&attachment.url, "not found"))
    }
}
