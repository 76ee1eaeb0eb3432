pub mod email;

use axum::Router;
use axum::http::StatusCode;

use crate::state::AppState;

/// Build the relay router. Anything other than `POST /send-email`,
/// including a wrong method on a known path, is a bare 404.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(email::router())
        .method_not_allowed_fallback(not_found)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
