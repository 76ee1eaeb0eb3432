//! Internal mail relay.
//!
//! Accepts `POST /send-email` with `{to, subject, html, text?}` from the
//! backend's notifier and forwards the message to SendGrid.

pub mod provider;
pub mod routes;
pub mod state;
