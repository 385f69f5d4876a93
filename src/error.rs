use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Transport failure or non-success status, from the relay or the origin alike.
    #[error("{0}")]
    Network(String),
    #[error("Invalid API response structure: {0}")]
    InvalidResponseShape(String),
    #[error("Invalid chapter data format - expected images array in data property")]
    InvalidChapterFormat,
    #[error("Please enter a search term")]
    EmptyQuery,
    #[error("listing entry has neither manwhaId nor id")]
    MissingIdentifier,
    #[error("Failed to decode image: {0}")]
    Image(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::Network(format!("HTTP error! Status: {}", status.as_u16())),
            None => Error::Network(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
