//! Notifying stage
//!
//! Delivers the finished report by email through the SendGrid HTTP API. The
//! pipeline talks to delivery through the [`Notifier`] trait so tests can
//! substitute a fake. Whether a delivery failure is fatal is decided by the
//! configured [`NotifyFailurePolicy`](crate::pipeline::config::NotifyFailurePolicy),
//! not here.

use crate::error::AppError;
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;

/// Default SendGrid API base URL
pub const SENDGRID_API_BASE_URL: &str = "https://api.sendgrid.com";

/// A report delivery channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the report body with the given subject
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), AppError>;
}

/// SendGrid-backed implementation of [`Notifier`]
#[derive(Clone)]
pub struct SendGridNotifier {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from_email: String,
    to_email: String,
}

impl SendGridNotifier {
    /// Create a notifier against the production SendGrid endpoint
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        from_email: String,
        to_email: String,
    ) -> Self {
        Self {
            http,
            base_url: SENDGRID_API_BASE_URL.to_string(),
            api_key,
            from_email,
            to_email,
        }
    }

    /// Override the API base URL (tests point this at a mock server)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::MissingCredentials(
                "SendGrid API key is empty".to_string(),
            ));
        }

        let url = format!("{}/v3/mail/send", self.base_url);
        let request_body = json!({
            "personalizations": [{
                "to": [{ "email": self.to_email }]
            }],
            "from": { "email": self.from_email },
            "subject": subject,
            "content": [{
                "type": "text/plain",
                "value": body
            }]
        });

        tracing::debug!(
            to = %self.to_email,
            subject_len = subject.len(),
            body_len = body.len(),
            "Sending report email"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                AppError::NotificationFailed(format!("Failed to reach SendGrid: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(AppError::NotificationFailed(format!(
                "SendGrid returned status {}: {}",
                status.as_u16(),
                error_body
            )));
        }

        tracing::debug!("Report email accepted for delivery");
        Ok(())
    }
}
