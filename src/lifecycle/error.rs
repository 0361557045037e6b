use crate::food::{FoodStatus, FoodStoreError};
use thiserror::Error;
use uuid::Uuid;

/// Malformed input rejected before any store mutation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    #[error("Malformed location: {0}")]
    MalformedLocation(String),

    #[error("Coordinates out of range: lat={lat}, lng={lng}")]
    CoordinatesOutOfRange { lat: f64, lng: f64 },
}

/// Errors surfaced by lifecycle operations
///
/// Notification failures never appear here; they are logged and dropped.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Food {0} not found")]
    NotFound(Uuid),

    #[error("Food {id} cannot change state while {status}")]
    InvalidState { id: Uuid, status: FoodStatus },

    #[error("Food {0} already picked up")]
    AlreadyPickedUp(Uuid),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] FoodStoreError),
}
