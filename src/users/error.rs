use thiserror::Error;

/// Errors that can occur when resolving users
#[derive(Error, Debug)]
pub enum UserDirectoryError {
    #[error("Failed to open user directory: {0}")]
    OpenError(String),

    #[error("User query failed: {0}")]
    QueryError(String),

    #[error("User directory is locked")]
    Locked,

    #[error("Other user directory error: {0}")]
    Other(#[from] anyhow::Error),
}
