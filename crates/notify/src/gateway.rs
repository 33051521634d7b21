use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::{config::NotifyConfig, error::NotifyError};

/// One rendered email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Sends rendered emails. Implementations report failure; deciding that a
/// failure is harmless is the caller's job.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Used when no mail relay is configured: records what would have been sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyGateway;

#[async_trait]
impl NotificationGateway for LogOnlyGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        info!(
            "Mail not configured. Would send to {} with subject '{}'",
            message.to, message.subject
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts each email as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailGateway {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    sender: String,
}

impl HttpMailGateway {
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url: config.mail_api_url.clone().unwrap_or_default(),
            api_key: config.mail_api_key.clone(),
            sender: config.default_sender.clone(),
        })
    }
}

#[async_trait]
impl NotificationGateway for HttpMailGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let payload = RelayPayload {
            from: &self.sender,
            to: &message.to,
            subject: &message.subject,
            html: &message.html_body,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("Posting email for {} to mail relay", message.to);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Email sent to {}", message.to);
        Ok(())
    }
}
