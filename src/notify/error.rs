use std::time::Duration;
use thiserror::Error;

/// Errors related to delivering notifications
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The notifier is misconfigured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The mail relay could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// The mail relay answered with a non-success status
    #[error("Mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// No answer within the configured bound
    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
