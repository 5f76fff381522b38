use std::error::Error as StdError;

/// Crate-wide result type for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed relay errors shared by the sink, fetcher and source traits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A delivery unit could not be built from the given input.
    #[error("invalid delivery unit: {message}")]
    InvalidUnit { message: String },

    /// An attachment could not be downloaded.
    #[error("attachment fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Operation is currently unavailable (wrong mode, not configured).
    #[error("relay operation unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped source error from a platform client.
    #[error("relay operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_unit(message: impl std::fmt::Display) -> Self {
        Self::InvalidUnit {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
