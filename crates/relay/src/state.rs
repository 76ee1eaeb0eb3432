//! Shared application state for the relay.

use std::sync::Arc;

use crate::provider::MailProvider;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MailProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn MailProvider>) -> Self {
        Self { provider }
    }
}
