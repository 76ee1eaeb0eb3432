//! Mail relay binary entrypoint.

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use edu_common::config::RelayConfig;

use edu_relay::provider::SendGridProvider;
use edu_relay::routes::create_router;
use edu_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("edu_relay=info,tower_http=debug")),
        )
        .init();

    tracing::info!("Starting mail relay...");

    let config = RelayConfig::from_env()?;
    tracing::debug!(?config, "Relay configuration loaded");

    let provider = SendGridProvider::new(&config)?;
    let state = AppState::new(Arc::new(provider));

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Mail relay listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received shutdown signal, stopping gracefully...");
            }
        })
        .await?;

    tracing::info!("Mail relay stopped.");
    Ok(())
}
