use crate::notify::error::NotifyError;
use crate::notify::notifier::Notifier;
use async_trait::async_trait;
use tracing::{debug, info};

/// Notifier that only writes messages to the log; used when no mail relay is configured
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!("Mail relay not configured; would send \"{subject}\" to {to}");
        debug!("Message body:\n{body}");
        Ok(())
    }
}
