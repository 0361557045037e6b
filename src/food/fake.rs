use crate::food::error::FoodStoreError;
use crate::food::food_store::FoodStore;
use crate::food::models::{
    FoodDetails, FoodQuery, FoodRecord, PurgeRule, StatusGuard, Transition, TransitionOutcome,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// A fake in-memory implementation of the FoodStore trait for testing
#[derive(Clone, Default)]
pub struct FakeFoodStore {
    records: Arc<RwLock<HashMap<Uuid, FoodRecord>>>,
    fail_purges: Arc<Mutex<HashSet<&'static str>>>,
}

impl FakeFoodStore {
    /// Create a new empty FakeFoodStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `delete_where` fail for rules with the given name ("expired" or "picked_up")
    pub fn fake_fail_purge(&self, rule_name: &'static str) {
        self.fail_purges.lock().unwrap().insert(rule_name);
    }

    /// Number of stored records
    pub fn fake_len(&self) -> usize {
        self.records.read().unwrap().len()
    }
}

#[async_trait]
impl FoodStore for FakeFoodStore {
    async fn get_food(&self, id: Uuid) -> Result<Option<FoodRecord>, FoodStoreError> {
        let records = self.records.read().map_err(|_| FoodStoreError::Locked)?;
        Ok(records.get(&id).cloned())
    }

    async fn insert_food(&self, record: FoodRecord) -> Result<Uuid, FoodStoreError> {
        let mut records = self.records.write().map_err(|_| FoodStoreError::Locked)?;
        let id = record.id;
        records.insert(id, record);
        Ok(id)
    }

    async fn update_details(
        &self,
        id: Uuid,
        details: FoodDetails,
        image: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<FoodRecord>, FoodStoreError> {
        let mut records = self.records.write().map_err(|_| FoodStoreError::Locked)?;
        Ok(records.get_mut(&id).map(|record| {
            record.details = details;
            if image.is_some() {
                record.image = image;
            }
            record.updated_at = at;
            record.clone()
        }))
    }

    async fn transition(
        &self,
        id: Uuid,
        guard: StatusGuard,
        transition: Transition,
    ) -> Result<TransitionOutcome, FoodStoreError> {
        let mut records = self.records.write().map_err(|_| FoodStoreError::Locked)?;
        let Some(record) = records.get_mut(&id) else {
            return Ok(TransitionOutcome::Missing);
        };

        if !guard.admits(record.status) {
            return Ok(TransitionOutcome::Rejected(record.clone()));
        }

        transition.apply(record);
        Ok(TransitionOutcome::Applied(record.clone()))
    }

    async fn delete_food(&self, id: Uuid) -> Result<bool, FoodStoreError> {
        let mut records = self.records.write().map_err(|_| FoodStoreError::Locked)?;
        Ok(records.remove(&id).is_some())
    }

    async fn delete_where(&self, rule: PurgeRule) -> Result<u64, FoodStoreError> {
        if self
            .fail_purges
            .lock()
            .map_err(|_| FoodStoreError::Locked)?
            .contains(rule.name())
        {
            return Err(FoodStoreError::Other(anyhow!(
                "Simulated failure for purge rule: {}",
                rule.name()
            )));
        }

        let mut records = self.records.write().map_err(|_| FoodStoreError::Locked)?;
        let before = records.len();
        records.retain(|_, record| !rule.matches(record));
        Ok((before - records.len()) as u64)
    }

    async fn query(&self, query: FoodQuery) -> Result<Vec<FoodRecord>, FoodStoreError> {
        let records = self.records.read().map_err(|_| FoodStoreError::Locked)?;
        let mut matching: Vec<FoodRecord> = records
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        // Newest first, ties broken by id to match SQLite ordering
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }
}
