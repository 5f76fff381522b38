use {async_trait::async_trait, bytes::Bytes};

use crate::error::Result;

/// A chat message as seen by the relay, stripped of platform specifics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    /// Display name of the author, interpolated verbatim into captions.
    pub author: String,
    /// Message text; empty when the message only carries attachments.
    pub text: String,
    /// Attachments in the order the platform reported them.
    pub attachments: Vec<Attachment>,
}

impl InboundEvent {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// File attached to an inbound message. Bytes are fetched lazily, and only
/// for images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: Option<String>,
    pub url: String,
    pub filename: String,
}

impl Attachment {
    pub fn new(url: impl Into<String>, mime_type: Option<&str>) -> Self {
        let url = url.into();
        let filename = url
            .split('?')
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string();
        Self {
            mime_type: mime_type.map(str::to_string),
            url,
            filename,
        }
    }

    /// Whether the content-type hint marks this as an image (`image/*`).
    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image"))
    }
}

/// Downloads attachment bytes on demand.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, attachment: &Attachment) -> Result<Bytes>;
}
