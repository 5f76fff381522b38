use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Discord(#[from] serenity::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid discord config: {message}")]
    Config { message: String },
}

impl Error {
    #[must_use]
    pub fn config(message: impl std::fmt::Display) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
