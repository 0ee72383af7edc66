pub mod handlers;
pub mod router;
pub mod state;

use std::sync::Arc;

use crate::config::RedactConfig;
use crate::dirs;
use crate::error::{RedactError, Result};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::session::FileSessionStore;
use crate::storage::FileObjectStore;

/// Build a pipeline backed by the on-disk stores under `config.data_dir`.
pub fn file_backed_pipeline(config: &RedactConfig) -> Result<Pipeline> {
    dirs::ensure_dirs(&config.data_dir)?;
    let sessions = Arc::new(FileSessionStore::new(dirs::sessions_dir(&config.data_dir)));
    let objects = Arc::new(FileObjectStore::new(dirs::objects_dir(&config.data_dir)));
    Pipeline::new(sessions, objects, PipelineOptions::from(config))
}

/// Start the HTTP server with the given configuration.
pub async fn start(config: RedactConfig) -> Result<()> {
    let pipeline = Arc::new(file_backed_pipeline(&config)?);
    tracing::info!(
        data_dir = %config.data_dir.display(),
        overlap_policy = ?config.overlap_policy,
        "Initialized pipeline"
    );

    let bind_addr = config.bind_address();
    let app_state = state::AppState::new(pipeline, Arc::new(config));

    let app = router::build(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| RedactError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RedactError::Server(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
