//! Inbound event → delivery units.

use tracing::{debug, warn};

use crate::{
    event::{AttachmentFetcher, InboundEvent},
    unit::{DeliveryUnit, PhotoUnit},
};

/// Bold author line, followed by the message text when there is any.
///
/// Author and text are interpolated verbatim; HTML-significant characters
/// reach the rich-text sink unescaped.
pub fn caption(author: &str, text: &str) -> String {
    if text.is_empty() {
        format!("<b>{author}</b>")
    } else {
        format!("<b>{author}</b>:\n{text}")
    }
}

/// Translate one inbound event into the ordered units to deliver.
///
/// Only the first attachment carries the caption; a non-image first
/// attachment folds its URL into the caption message instead. Attachments
/// whose bytes cannot be fetched are logged and skipped without shifting the
/// position of the ones after them.
pub async fn translate(event: &InboundEvent, fetcher: &dyn AttachmentFetcher) -> Vec<DeliveryUnit> {
    let caption = caption(&event.author, &event.text);

    if event.attachments.is_empty() {
        if event.text.is_empty() {
            return Vec::new();
        }
        return vec![DeliveryUnit::text(caption)];
    }

    let mut units = Vec::with_capacity(event.attachments.len());
    for (position, attachment) in event.attachments.iter().enumerate() {
        if attachment.is_image() {
            let image = match fetcher.fetch(attachment).await {
                Ok(image) => image,
                Err(e) => {
                    warn!(
                        url = %attachment.url,
                        position,
                        error = %e,
                        "skipping attachment: fetch failed"
                    );
                    continue;
                },
            };
            debug!(url = %attachment.url, bytes = image.len(), "fetched image attachment");

            let photo_caption = if position == 0 { caption.as_str() } else { "" };
            match PhotoUnit::new(image, photo_caption) {
                Ok(photo) => units.push(photo.into()),
                Err(e) => warn!(url = %attachment.url, position, error = %e, "skipping attachment"),
            }
        } else if position == 0 && !event.text.is_empty() {
            units.push(DeliveryUnit::text(format!("{caption}\n{}", attachment.url)));
        } else {
            units.push(DeliveryUnit::text(attachment.url.clone()));
        }
    }
    units
}
