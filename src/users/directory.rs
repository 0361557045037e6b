use crate::users::error::UserDirectoryError;
use crate::users::models::UserContact;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// UserDirectory trait used to resolve donors into notification targets
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Find a user by id
    async fn find_user(&self, id: Uuid) -> Result<Option<UserContact>, UserDirectoryError>;

    /// Register a user
    async fn add_user(&self, user: UserContact) -> Result<(), UserDirectoryError>;
}

#[async_trait]
impl<T: UserDirectory + ?Sized> UserDirectory for Arc<T> {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserContact>, UserDirectoryError> {
        (**self).find_user(id).await
    }

    async fn add_user(&self, user: UserContact) -> Result<(), UserDirectoryError> {
        (**self).add_user(user).await
    }
}
