//! HTTP backend: router assembly, server startup, and graceful shutdown.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use coursehub_config::Config;
use coursehub_identity::{IdentityGateway, MemoryIdentityGateway};
use coursehub_store::{BlobStore, FsBlobStore, MemoryRecordStore, RecordStore};
use coursehub_summarizer::{GenerativeSummarizer, Summarizer, UnconfiguredSummarizer};
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use crate::error::AppError;
pub use crate::state::AppState;

/// Builds the full application router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_router())
        .route("/blobs/*path", get(routes::files::serve))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wires the collaborators from the configuration and serves until SIGINT or
/// SIGTERM.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(config.blob_dir.clone()));
    let identity: Arc<dyn IdentityGateway> = Arc::new(MemoryIdentityGateway::new());
    let summarizer: Arc<dyn Summarizer> = match config.summarizer.clone() {
        Some(summarizer) => Arc::new(GenerativeSummarizer::new(summarizer)),
        None => Arc::new(UnconfiguredSummarizer),
    };
    let state = AppState::new(store, blobs, identity, summarizer);

    let listener = tokio::net::TcpListener::bind(&config.listen_address).await?;
    info!(address = %config.listen_address, "listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl+c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
