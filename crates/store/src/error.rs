use thiserror::Error;

use beatline_domain::DomainError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid beat map: {0}")]
    InvalidBeatMap(#[from] DomainError),
}

impl StoreError {
    pub fn backend<T: Into<String>>(message: T) -> Self {
        Self::Backend(message.into())
    }
}
