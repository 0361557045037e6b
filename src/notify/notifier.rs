use crate::notify::error::NotifyError;
use async_trait::async_trait;
use std::sync::Arc;

/// Notifier trait for sending transactional emails
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Send one message
    ///
    /// * `to` - Recipient address
    /// * `subject` - Subject line
    /// * `body` - HTML body
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Lets a single notifier, chosen at startup, be shared behind `Arc<dyn Notifier>`
#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        (**self).send(to, subject, body).await
    }
}
