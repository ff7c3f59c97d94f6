//! Backend selection and the HTTP listener.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use workbench_backend::{Backend, HttpBackend, HttpBackendConfig, MemoryBackend};
use workbench_config::{BackendKind, WorkbenchConfig};

use crate::error::Result;
use crate::routes::router;
use crate::state::AppState;

/// The backend named by `config.backend.kind`.
pub fn build_backend(config: &WorkbenchConfig) -> Arc<dyn Backend> {
    match config.backend.kind {
        BackendKind::Memory => {
            warn!("using the in-memory backend; data is lost on restart");
            Arc::new(MemoryBackend::new())
        }
        BackendKind::Http => Arc::new(HttpBackend::new(HttpBackendConfig {
            endpoint: config.backend.endpoint.clone(),
            project_id: config.backend.project_id.clone(),
            api_key: config.backend.api_key.clone(),
            database_id: config.backend.database_id.clone(),
        })),
    }
}

/// Serve until ctrl-c.
pub async fn serve(config: WorkbenchConfig) -> Result<()> {
    config.validate()?;
    let backend = build_backend(&config);
    let state = AppState::new(Arc::clone(&backend), &config).await?;
    let app = router(state);

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        backend = backend.kind(),
        "workbench listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("workbench stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
