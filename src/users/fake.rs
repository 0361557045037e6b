use crate::users::directory::UserDirectory;
use crate::users::error::UserDirectoryError;
use crate::users::models::UserContact;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// A fake in-memory implementation of the UserDirectory trait for testing
#[derive(Clone, Default)]
pub struct FakeUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, UserContact>>>,
    fail_lookups: Arc<AtomicBool>,
}

impl FakeUserDirectory {
    /// Create a new empty FakeUserDirectory
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every lookup fail until reset
    pub fn fake_fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserContact>, UserDirectoryError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(UserDirectoryError::Other(anyhow!(
                "Simulated lookup failure for user {id}"
            )));
        }
        let users = self.users.read().map_err(|_| UserDirectoryError::Locked)?;
        Ok(users.get(&id).cloned())
    }

    async fn add_user(&self, user: UserContact) -> Result<(), UserDirectoryError> {
        let mut users = self.users.write().map_err(|_| UserDirectoryError::Locked)?;
        users.insert(user.id, user);
        Ok(())
    }
}
