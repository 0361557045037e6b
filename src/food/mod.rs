pub mod error;
#[cfg(test)]
pub mod fake;
pub mod food_store;
pub mod models;
pub mod sqlite;

pub use error::FoodStoreError;
#[cfg(test)]
pub use fake::FakeFoodStore;
pub use food_store::FoodStore;
pub use models::{
    Address, Claim, FoodDetails, FoodQuery, FoodRecord, FoodStatus, Location, PurgeRule,
    StatusGuard, Transition, TransitionOutcome,
};
pub use sqlite::SqliteFoodStore;
