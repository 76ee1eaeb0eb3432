//! Password-reset message rendering.

use edu_common::types::EmailMessage;

pub const PRODUCT_NAME: &str = "EduPlatform";

/// How long a reset code stays valid, as stated in the message body.
pub const CODE_EXPIRY_MINUTES: u32 = 15;

pub const RESET_SUBJECT: &str = "Your EduPlatform Password Reset Code";

/// A password-reset notification for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetNotification {
    pub recipient: String,
    pub code: String,
    pub display_name: String,
}

impl ResetNotification {
    pub fn new(
        recipient: impl Into<String>,
        code: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            code: code.into(),
            display_name: display_name.into(),
        }
    }

    pub fn subject(&self) -> &'static str {
        RESET_SUBJECT
    }

    /// Plain-text body. The display name is embedded as given.
    pub fn render_text(&self) -> String {
        format!(
            "Hi {name},\n\n\
             You requested a password reset for your {PRODUCT_NAME} account.\n\n\
             Your verification code is: {code}\n\n\
             This code expires in {CODE_EXPIRY_MINUTES} minutes.\n\n\
             If you didn't request this, you can safely ignore this email.\n\n\
             - {PRODUCT_NAME} Team",
            name = self.display_name,
            code = self.code,
        )
    }

    /// HTML body. Only the display name is escaped; the code is generated
    /// server-side.
    pub fn render_html(&self) -> String {
        let name = escape_html(&self.display_name);
        let code = &self.code;

        let mut html = String::with_capacity(1024);
        html.push_str(
            "<div style=\"font-family: Arial, sans-serif; max-width: 500px; margin: 0 auto; padding: 20px;\">",
        );
        html.push_str("<div style=\"text-align: center; padding: 20px 0;\">");
        html.push_str(&format!(
            "<h2 style=\"color: #3b82f6; margin: 0;\">{PRODUCT_NAME}</h2>"
        ));
        html.push_str("</div>");
        html.push_str(
            "<div style=\"background: #f8fafc; border-radius: 8px; padding: 30px; text-align: center;\">",
        );
        html.push_str("<h3 style=\"margin-top: 0;\">Password Reset Request</h3>");
        html.push_str(&format!("<p>Hi {name},</p>"));
        html.push_str(
            "<p>You requested a password reset. Use the code below to verify your identity:</p>",
        );
        html.push_str(
            "<div style=\"background: #ffffff; border: 2px dashed #3b82f6; border-radius: 8px; padding: 20px; margin: 20px 0;\">",
        );
        html.push_str(&format!(
            "<span style=\"font-size: 32px; font-weight: bold; letter-spacing: 8px; color: #1e293b;\">{code}</span>"
        ));
        html.push_str("</div>");
        html.push_str(&format!(
            "<p style=\"color: #64748b; font-size: 14px;\">This code expires in {CODE_EXPIRY_MINUTES} minutes.</p>"
        ));
        html.push_str(
            "<p style=\"color: #64748b; font-size: 14px;\">If you didn't request this, you can safely ignore this email.</p>",
        );
        html.push_str("</div>");
        html.push_str("</div>");
        html
    }

    /// Render both bodies into the wire message.
    pub fn to_message(&self) -> EmailMessage {
        EmailMessage {
            to: self.recipient.clone(),
            subject: self.subject().to_string(),
            text: self.render_text(),
            html: self.render_html(),
        }
    }
}

/// Escape `&`, `<`, `>` and `"` for embedding in HTML text.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
