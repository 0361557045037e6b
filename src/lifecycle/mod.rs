pub mod engine;
pub mod error;
pub mod input;

pub use engine::{ClaimRequest, LifecycleEngine};
pub use error::{LifecycleError, ValidationError};
pub use input::FoodInput;
