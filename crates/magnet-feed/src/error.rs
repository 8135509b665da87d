//! Error taxonomy shared by every feed operation.

use magnet_token::TokenError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Lookup miss. Feed-token misses always carry the same message so a
    /// caller cannot tell an unassigned token from a malformed one.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Token encoding failed: {0}")]
    Encoding(#[from] TokenError),

    #[error("Feed serialization failed: {0}")]
    Serialization(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] anyhow::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl FeedError {
    pub(crate) fn unknown_feed() -> Self {
        FeedError::NotFound("feed".to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
