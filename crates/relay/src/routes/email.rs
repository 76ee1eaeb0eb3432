//! Email relay route.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use edu_common::error::AppError;
use edu_common::types::SendEmailRequest;

use crate::state::AppState;

pub const MISSING_FIELDS: &str = "Missing required fields: to, subject, html";

pub fn router() -> Router<AppState> {
    Router::new().route("/send-email", post(send_email))
}

/// POST /send-email — Validate the message and hand it to the mail provider.
///
/// The body is parsed as JSON whatever its `Content-Type` says.
async fn send_email(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let email = serde_json::from_slice::<SendEmailRequest>(&body)
        .ok()
        .and_then(SendEmailRequest::validate)
        .ok_or_else(|| AppError::Validation(MISSING_FIELDS.to_string()))?;

    if let Err(e) = state.provider.send(&email).await {
        tracing::error!(to = %email.to, error = %e, "Email send failed");
        return Err(AppError::Delivery(e.to_string()));
    }

    tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
    Ok(Json(json!({ "success": true })))
}
