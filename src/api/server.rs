use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use super::{
    services::{health, index, submit},
    state::AppState,
};
use crate::config::{Config, Credentials};
use crate::observability::Metrics;
use crate::pipeline::Orchestrator;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Routes and middleware around an already-wired [`AppState`]
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_form_bytes.as_usize();

    Router::new()
        .route("/", get(index).post(submit))
        .route("/health", get(health))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config, credentials: Credentials) -> Result<(), AnyError> {
    let address: SocketAddr = config.server.bind_addr;

    info!(
        engine = ?config.audio.engine,
        scratch_root = %config.storage.scratch_root.display(),
        "Wiring pipeline"
    );
    tokio::fs::create_dir_all(&config.storage.scratch_root)
        .await
        .map_err(|e| format!("Failed to create scratch root: {}", e))?;

    let metrics = Arc::new(Metrics::new());
    let orchestrator = Orchestrator::from_config(&config, credentials, metrics)
        .map_err(|e| format!("Failed to build mail client: {}", e))?;

    let app = build_router(AppState::new(config, orchestrator));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Mashup service listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
