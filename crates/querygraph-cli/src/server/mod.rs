//! HTTP server module for serve mode.
//!
//! This module provides a local HTTP server that renders the interactive
//! viewer page and exposes a REST API over the shared graph view.

pub mod api;
pub mod state;
mod viewer;
mod watcher;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::input::BatchSource;

pub use state::{AppState, ServerConfig};

/// Run the HTTP server with the viewer page.
///
/// This function blocks until the server is shut down (e.g., via Ctrl+C).
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(config.clone()).await?);

    // Start file watcher in background
    let watcher_state = Arc::clone(&state);
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watcher::start_watcher(watcher_state).await {
            eprintln!("querygraph: watcher error: {e}");
        }
    });

    let app = build_router(state, config.port);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    // Bind to port first to ensure it's available before opening browser
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    println!("querygraph: server listening on http://{addr}");

    if config.open_browser {
        let url = format!("http://localhost:{}", config.port);
        if let Err(e) = open::that(&url) {
            eprintln!("querygraph: warning: failed to open browser: {e}");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    watcher_handle.abort();
    println!("\nquerygraph: server stopped");

    Ok(())
}

/// Build the main router with all routes.
pub fn build_router(state: Arc<AppState>, port: u16) -> Router {
    // Same-origin only; the API exposes local batch files.
    let allowed_origins = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
    ]
    .into_iter()
    .filter_map(|origin| HeaderValue::from_str(&origin).ok())
    .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", api::api_routes())
        .merge(viewer::viewer_routes())
        .with_state(state)
        .layer(cors)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("querygraph: warning: failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Scan directories for batch JSON files.
///
/// Files are returned in path order so reloads produce the same graph, along
/// with their modification times.
pub fn scan_batch_files(
    dirs: &[PathBuf],
) -> Result<(Vec<BatchSource>, HashMap<PathBuf, SystemTime>)> {
    let mut sources = Vec::new();
    let mut mtimes = HashMap::new();

    for dir in dirs {
        if !dir.exists() {
            eprintln!(
                "querygraph: warning: watch directory does not exist: {}",
                dir.display()
            );
            continue;
        }

        // Symlinks could expose files outside the watched directories.
        for entry in walkdir::WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_batch_file(path) {
                continue;
            }

            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if let Some(modified) = entry.metadata().ok().and_then(|meta| meta.modified().ok()) {
                mtimes.insert(path.to_path_buf(), modified);
            }

            let name = path
                .strip_prefix(dir)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();
            sources.push(BatchSource { name, content });
        }
    }

    Ok((sources, mtimes))
}

pub(crate) fn is_batch_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
