//! Error type shared by every part of the feed library.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with status {status}")]
    Status { status: u16, url: String },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("channel {0} does not support outbound replies")]
    UnsupportedChannel(String),

    #[error("operator {0} is not allowed to reply")]
    NotPermitted(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("feed actor has shut down")]
    FeedClosed,
}

impl From<garde::Report> for FeedError {
    fn from(report: garde::Report) -> Self {
        FeedError::Validation(report.to_string())
    }
}
