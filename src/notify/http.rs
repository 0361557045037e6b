use crate::config::NotifyConfig;
use crate::notify::error::NotifyError;
use crate::notify::notifier::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// JSON payload accepted by the mail relay
#[derive(Debug, Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Notifier that hands messages to an HTTP mail relay
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
    timeout: Duration,
}

impl HttpMailer {
    /// Create a mailer from configuration; fails if no endpoint is set
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| NotifyError::Configuration("notify.endpoint is not set".to_string()))?;

        info!(
            "Creating HttpMailer: endpoint={}, from={}, timeout={:?}",
            endpoint,
            config.from,
            config.timeout()
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| NotifyError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            timeout: config.timeout(),
        })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        debug!("Posting mail \"{subject}\" for {to} to {}", self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&OutgoingMail {
            from: &self.from,
            to,
            subject,
            html: body,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NotifyError::Timeout(self.timeout)
            } else {
                NotifyError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
