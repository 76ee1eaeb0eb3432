//! Password-reset notifications.
//!
//! [`template`] renders the message; [`mailer`] posts it to the outbound
//! email service and falls back to logging the code when that fails.

pub mod mailer;
pub mod template;

pub use mailer::{NotifyError, PasswordResetMailer};
pub use template::{ResetNotification, escape_html};
