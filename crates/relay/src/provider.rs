//! Mail providers the relay forwards to.
//!
//! [`SendGridProvider`] talks to the SendGrid v3 `mail/send` API. The
//! [`MailProvider`] trait exists so route tests can swap in a stub.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use edu_common::config::RelayConfig;
use edu_common::types::OutboundEmail;

const SEND_PATH: &str = "/v3/mail/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered but refused the message. Holds the provider's
    /// error detail as reported back to the relay caller.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ProviderError>;
}

#[derive(Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

/// SendGrid v3 HTTP API client.
pub struct SendGridProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl SendGridProvider {
    pub fn new(config: &RelayConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{SEND_PATH}", config.sendgrid_api_url.trim_end_matches('/')),
            api_key: config.sendgrid_api_key.clone(),
            from: config.email_from.clone(),
        })
    }

    fn payload<'a>(&'a self, email: &'a OutboundEmail) -> MailSend<'a> {
        // SendGrid requires text/plain to precede text/html.
        let mut content = Vec::with_capacity(2);
        if let Some(text) = email.text.as_deref() {
            content.push(Content {
                kind: "text/plain",
                value: text,
            });
        }
        content.push(Content {
            kind: "text/html",
            value: &email.html,
        });

        MailSend {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from: Address { email: &self.from },
            subject: &email.subject,
            content,
        }
    }
}

#[async_trait]
impl MailProvider for SendGridProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(email))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Rejected(rejection_detail(status, &body)))
    }
}

/// The provider's `errors` array when present, else status and raw body.
fn rejection_detail(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("errors").map(|errors| errors.to_string()))
        .unwrap_or_else(|| format!("SendGrid returned status {status}: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SendGridProvider {
        SendGridProvider::new(&RelayConfig {
            sendgrid_api_key: "SG.test".to_string(),
            sendgrid_api_url: "http://localhost:9999/".to_string(),
            email_from: "noreply@eduplatform.test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(provider().endpoint, "http://localhost:9999/v3/mail/send");
    }

    #[test]
    fn test_payload_shape() {
        let provider = provider();
        let email = OutboundEmail {
            to: "ada@example.com".to_string(),
            subject: "Reset".to_string(),
            html: "<p>hi</p>".to_string(),
            text: Some("hi".to_string()),
        };
        let json = serde_json::to_value(provider.payload(&email)).unwrap();

        assert_eq!(json["personalizations"][0]["to"][0]["email"], "ada@example.com");
        assert_eq!(json["from"]["email"], "noreply@eduplatform.test");
        assert_eq!(json["subject"], "Reset");
        assert_eq!(json["content"][0]["type"], "text/plain");
        assert_eq!(json["content"][1]["type"], "text/html");
        assert_eq!(json["content"][1]["value"], "<p>hi</p>");
    }

    #[test]
    fn test_payload_html_only() {
        let provider = provider();
        let email = OutboundEmail {
            to: "ada@example.com".to_string(),
            subject: "Reset".to_string(),
            html: "<p>hi</p>".to_string(),
            text: None,
        };
        let json = serde_json::to_value(provider.payload(&email)).unwrap();
        assert_eq!(json["content"].as_array().unwrap().len(), 1);
        assert_eq!(json["content"][0]["type"], "text/html");
    }

    #[test]
    fn test_rejection_detail_prefers_errors_array() {
        let detail = rejection_detail(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"errors":[{"message":"bad from","field":"from"}]}"#,
        );
        let errors: serde_json::Value = serde_json::from_str(&detail).unwrap();
        assert_eq!(errors[0]["message"], "bad from");
        assert_eq!(errors[0]["field"], "from");
    }

    #[test]
    fn test_rejection_detail_falls_back_to_body() {
        let detail = rejection_detail(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(detail, "SendGrid returned status 502 Bad Gateway: upstream down");
    }
}
