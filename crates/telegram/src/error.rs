use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    #[error("invalid telegram config: {message}")]
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

impl From<Error> for courier_relay::Error {
    fn from(err: Error) -> Self {
        Self::external("telegram", err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
