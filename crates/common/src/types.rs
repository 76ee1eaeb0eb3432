use serde::{Deserialize, Serialize};

/// A rendered email as posted to `EMAIL_SERVICE_URL`.
///
/// Wire format: `{"to", "subject", "text", "html"}`, all strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Body accepted by the relay's `POST /send-email`.
///
/// Every field is optional at the serde level so that missing fields are
/// reported as a validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendEmailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
}

/// A relay request whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

impl SendEmailRequest {
    /// Check that `to`, `subject` and `html` are present and non-empty.
    pub fn validate(self) -> Option<OutboundEmail> {
        let present = |field: Option<String>| field.filter(|value| !value.is_empty());
        Some(OutboundEmail {
            to: present(self.to)?,
            subject: present(self.subject)?,
            html: present(self.html)?,
            text: present(self.text),
        })
    }
}

impl From<EmailMessage> for OutboundEmail {
    fn from(message: EmailMessage) -> Self {
        Self {
            to: message.to,
            subject: message.subject,
            html: message.html,
            text: Some(message.text),
        }
    }
}
