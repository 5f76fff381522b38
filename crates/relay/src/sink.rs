use {async_trait::async_trait, bytes::Bytes};

use crate::{error::Result, unit::DeliveryUnit};

/// Outbound messaging endpoint.
///
/// Every call is an independent request: no retries, no ordering of its own.
/// Callers keep order by awaiting each send before the next.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send_text(&self, body: &str) -> Result<()>;

    async fn send_photo(&self, image: Bytes, caption: &str) -> Result<()>;

    /// Send one delivery unit through the matching operation.
    async fn deliver(&self, unit: &DeliveryUnit) -> Result<()> {
        match unit {
            DeliveryUnit::Text(text) => self.send_text(text.body()).await,
            DeliveryUnit::Photo(photo) => {
                self.send_photo(photo.image().clone(), photo.caption())
                    .await
            },
        }
    }
}
