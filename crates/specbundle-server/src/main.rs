//! # specbundle-server
//!
//! HTTP server for specbundle.
//!
//! This binary provides:
//! - REST API for browsing, bundling, splitting and documenting the project
//! - the static web UI, when `project.ui_dir` is configured
//! - structured logging to a rolling file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Serve the current directory on 127.0.0.1:5000
//! cargo run --package specbundle-server
//!
//! # Another project and port
//! SPECBUNDLE_PROJECT__ROOT=/srv/api SPECBUNDLE_SERVER__PORT=8080 ./specbundle-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use anyhow::Context;
use specbundle_core::Settings;
use specbundle_server::api::create_router;
use specbundle_server::logging;
use specbundle_server::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;

    logging::init(&settings.logging, &settings.log_directory())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        project_root = %settings.project_root().display(),
        root_spec = %settings.project.root_spec.display(),
        "Starting specbundle-server"
    );

    let state = AppState::from_settings(&settings);
    if !state.service().root_spec_exists() {
        tracing::warn!(
            root_spec = %settings.project.root_spec.display(),
            "Root specification not found; split one into the project to get started"
        );
    }

    let ui_dir = settings.ui_directory();
    let app = create_router(state, ui_dir.as_deref());

    let addr = settings.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
