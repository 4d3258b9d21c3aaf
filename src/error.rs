use std::error::Error as StdError;

/// Failure of a single product search call.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-2xx response. `-1` when the transport returned no status.
    #[error("HTTP status {0}")]
    Http(i32),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),
}

impl ProductError {
    /// Wrap a transport-level fault.
    pub fn network<E>(cause: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        ProductError::Network(cause.into())
    }
}

impl From<reqwest::Error> for ProductError {
    fn from(err: reqwest::Error) -> Self {
        ProductError::Network(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ProductError>;

/// Failure while constructing a [`Showcase`](crate::Showcase).
#[derive(Debug, thiserror::Error)]
pub enum ShowcaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
