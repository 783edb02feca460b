//! Tidemark Webhooks - inbound platform event ingestion service.
//!
//! Serves `POST /webhooks/{platform}` on port 3100 by default.
//!
//! # Security
//!
//! This binary verifies every delivery against per-platform shared secrets
//! before parsing. It holds no platform API credentials - outbound calls
//! live in the adapter crate and whatever service drives it.

#![cfg_attr(not(test), forbid(unsafe_code))]

use tidemark_webhooks::{app, config::WebhooksConfig, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config = WebhooksConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter; defaults to info level for our
    // crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tidemark_webhooks=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = config.socket_addr();
    let state = AppState::new(config);

    tracing::info!("webhooks listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
