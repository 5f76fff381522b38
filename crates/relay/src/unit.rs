use bytes::Bytes;

use crate::error::{Error, Result};

/// Plain (HTML parse mode) text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    body: String,
}

impl TextUnit {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Photo upload with an optional caption.
///
/// The image is never empty; [`PhotoUnit::new`] rejects empty payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUnit {
    image: Bytes,
    caption: String,
}

impl PhotoUnit {
    pub fn new(image: impl Into<Bytes>, caption: impl Into<String>) -> Result<Self> {
        let image = image.into();
        if image.is_empty() {
            return Err(Error::invalid_unit("photo requires non-empty image bytes"));
        }
        Ok(Self {
            image,
            caption: caption.into(),
        })
    }

    /// Image payload. Cloning `Bytes` is a refcount bump.
    pub fn image(&self) -> &Bytes {
        &self.image
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }
}

/// One atomic piece of content destined for the outbound sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryUnit {
    Text(TextUnit),
    Photo(PhotoUnit),
}

impl DeliveryUnit {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(TextUnit::new(body))
    }

    pub fn photo(image: impl Into<Bytes>, caption: impl Into<String>) -> Result<Self> {
        PhotoUnit::new(image, caption).map(Self::Photo)
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Photo(_) => "photo",
        }
    }
}

impl From<TextUnit> for DeliveryUnit {
    fn from(unit: TextUnit) -> Self {
        Self::Text(unit)
    }
}

impl From<PhotoUnit> for DeliveryUnit {
    fn from(unit: PhotoUnit) -> Self {
        Self::Photo(unit)
    }
}
