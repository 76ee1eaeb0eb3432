//! Best-effort delivery of password-reset codes.
//!
//! Each call makes exactly one `POST {EMAIL_SERVICE_URL}` attempt. There is
//! no retry, backoff, or queue. When the endpoint is missing, rejects the
//! message, or cannot be reached, the code is written to the log instead so
//! an operator can still hand it over.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use edu_common::config::AppConfig;
use edu_common::types::EmailMessage;

use crate::template::ResetNotification;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("EMAIL_SERVICE_URL not configured")]
    NotConfigured,

    #[error("email service returned status {0}")]
    Rejected(StatusCode),

    #[error("email request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Sends password-reset codes to the outbound email service.
///
/// Cheap to clone; clones share one connection pool. All per-call state is
/// local, so one instance can serve any number of concurrent tasks.
#[derive(Debug, Clone)]
pub struct PasswordResetMailer {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl PasswordResetMailer {
    /// Build a mailer for `endpoint`. `None` or an empty string puts it in
    /// log-only mode.
    pub fn new(endpoint: Option<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()?;

        let endpoint = endpoint.filter(|url| !url.is_empty());
        if endpoint.is_none() {
            tracing::warn!("EMAIL_SERVICE_URL not configured, reset codes will only be logged");
        }

        Ok(Self { endpoint, client })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, NotifyError> {
        Self::new(config.email_service_url.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// One delivery attempt. Only HTTP 200 counts as delivered.
    pub async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let endpoint = self.endpoint.as_deref().ok_or(NotifyError::NotConfigured)?;

        let response = self.client.post(endpoint).json(message).send().await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(NotifyError::Rejected(status)),
        }
    }

    /// Send a password-reset code. Returns whether the email service
    /// accepted it; never fails.
    ///
    /// On any failure the code itself is logged as a fallback.
    pub async fn send_password_reset_code(&self, to: &str, code: &str, user_name: &str) -> bool {
        if !self.is_configured() {
            tracing::warn!(
                to = %to,
                code = %code,
                "EMAIL_SERVICE_URL not configured, password reset code logged instead"
            );
            return false;
        }

        let message = ResetNotification::new(to, code, user_name).to_message();

        match self.deliver(&message).await {
            Ok(()) => {
                tracing::info!(to = %to, "Password reset email sent");
                true
            }
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Failed to send password reset email");
                tracing::warn!(to = %to, code = %code, "FALLBACK: password reset code");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PasswordResetMailer>();
    }

    #[test]
    fn test_empty_endpoint_is_unconfigured() {
        assert!(!PasswordResetMailer::new(None).unwrap().is_configured());
        assert!(!PasswordResetMailer::new(Some(String::new())).unwrap().is_configured());
        assert!(
            PasswordResetMailer::new(Some("http://127.0.0.1:5001/send-email".to_string()))
                .unwrap()
                .is_configured()
        );
    }

    #[test]
    fn test_from_config_uses_email_service_url() {
        let mut config = AppConfig {
            database_url: "postgres://localhost/edu".to_string(),
            email_service_url: Some("http://127.0.0.1:5001/send-email".to_string()),
            db_max_connections: 10,
        };
        assert!(PasswordResetMailer::from_config(&config).unwrap().is_configured());

        config.email_service_url = None;
        assert!(!PasswordResetMailer::from_config(&config).unwrap().is_configured());
    }

    #[tokio::test]
    async fn test_deliver_without_endpoint() {
        let mailer = PasswordResetMailer::new(None).unwrap();
        let message = ResetNotification::new("a@example.com", "123456", "A").to_message();
        let err = mailer.deliver(&message).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_returns_false() {
        let mailer = PasswordResetMailer::new(Some("not a url".to_string())).unwrap();
        assert!(!mailer.send_password_reset_code("a@example.com", "123456", "A").await);
    }
}
