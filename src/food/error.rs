use thiserror::Error;

/// Errors that can occur when interacting with the food record store
#[derive(Error, Debug)]
pub enum FoodStoreError {
    #[error("Failed to open storage: {0}")]
    OpenError(String),

    #[error("Storage operation failed: {0}")]
    OperationError(String),

    #[error("Storage is locked")]
    Locked,

    #[error("Other storage error: {0}")]
    Other(#[from] anyhow::Error),
}
