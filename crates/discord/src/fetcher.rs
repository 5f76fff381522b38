use std::time::Duration;

use {async_trait::async_trait, bytes::Bytes, tracing::debug};

use courier_relay::{Attachment, AttachmentFetcher, Error, Result};

/// Give up on a single attachment download after this long.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads attachment bytes from their CDN URL.
#[derive(Clone)]
pub struct HttpAttachmentFetcher {
    client: reqwest::Client,
}

impl HttpAttachmentFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a fetcher whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl AttachmentFetcher for HttpAttachmentFetcher {
    async fn fetch(&self, attachment: &Attachment) -> Result<Bytes> {
        let url = attachment.url.as_str();
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {status}")));
        }

        let bytes = resp.bytes().await.map_err(|e| Error::fetch(url, e))?;
        if bytes.is_empty() {
            return Err(Error::fetch(url, "empty body"));
        }
        debug!(
            filename = %attachment.filename,
            bytes = bytes.len(),
            "attachment downloaded"
        );
        Ok(bytes)
    }
}
