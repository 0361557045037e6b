use crate::food::error::FoodStoreError;
use crate::food::models::{
    FoodDetails, FoodQuery, FoodRecord, PurgeRule, StatusGuard, Transition, TransitionOutcome,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// FoodStore trait defining the interface for persisting food listings
#[async_trait]
pub trait FoodStore: Send + Sync + 'static {
    /// Get a listing by id
    async fn get_food(&self, id: Uuid) -> Result<Option<FoodRecord>, FoodStoreError>;

    /// Insert a new listing, returning its id
    async fn insert_food(&self, record: FoodRecord) -> Result<Uuid, FoodStoreError>;

    /// Overwrite the descriptive fields of a listing, leaving lifecycle fields untouched
    ///
    /// * `image` - Replaces the image reference only when `Some`
    /// * `at` - Recorded as the update time
    async fn update_details(
        &self,
        id: Uuid,
        details: FoodDetails,
        image: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<FoodRecord>, FoodStoreError>;

    /// Apply a lifecycle transition if, and only if, the current status satisfies `guard`
    ///
    /// The check and the write happen atomically with respect to other calls.
    async fn transition(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: Transition,
    ) -> Result<TransitionOutcome, FoodStoreError>;

    /// Delete a listing, returning whether it existed
    async fn delete_food(&self, id: Uuid) -> Result<bool, FoodStoreError>;

    /// Delete every listing matching `rule`, returning how many were removed
    async fn delete_where(&self, rule: PurgeRule) -> Result<u64, FoodStoreError>;

    /// List listings matching `query`, newest first
    async fn query(&self, query: FoodQuery) -> Result<Vec<FoodRecord>, FoodStoreError>;
}

/// Implementation of FoodStore trait for Arc<T> where T implements FoodStore
///
/// Lets the lifecycle engine and the cleanup sweeper share one store instance.
#[async_trait]
impl<T: FoodStore + ?Sized> FoodStore for Arc<T> {
    async fn get_food(&self, id: Uuid) -> Result<Option<FoodRecord>, FoodStoreError> {
        (**self).get_food(id).await
    }

    async fn insert_food(&self, record: FoodRecord) -> Result<Uuid, FoodStoreError> {
        (**self).insert_food(record).await
    }

    async fn update_details(
        &self,
        id: Uuid,
        details: FoodDetails,
        image: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<FoodRecord>, FoodStoreError> {
        (**self).update_details(id, details, image, at).await
    }

    async fn transition(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: Transition,
    ) -> Result<TransitionOutcome, FoodStoreError> {
        (**self).transition(id, guard, transition).await
    }

    async fn delete_food(&self, id: Uuid) -> Result<bool, FoodStoreError> {
        (**self).delete_food(id).await
    }

    async fn delete_where(&self, rule: PurgeRule) -> Result<u64, FoodStoreError> {
        (**self).delete_where(rule).await
    }

    async fn query(&self, query: FoodQuery) -> Result<Vec<FoodRecord>, FoodStoreError> {
        (**self).query(query).await
    }
}
