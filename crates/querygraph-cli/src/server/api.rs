//! REST API handlers for serve mode.
//!
//! Every client shares one graph view: selecting a node through the API
//! changes what `/api/view` and the viewer page render for everyone.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use querygraph_core::{
    parse_batch_value, GraphSummary, IngestError, LayoutConfig, Selection, ViewFrame,
    ViewportState,
};
use querygraph_export::{
    export_csv_bundle, export_html, export_json, export_mermaid, ExportError, ExportFormat,
    ExportNaming,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use super::AppState;

/// Upper bound for uploaded batch documents.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the API router with all endpoints.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/records",
            get(records).put(replace_records).post(append_records),
        )
        .route("/graph", get(graph))
        .route("/view", get(view))
        .route("/select", post(select).delete(clear_selection))
        .route("/reload", post(reload))
        .route("/export/{format}", get(export))
        .route("/config", get(config))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

// === Errors ===

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
    #[error("Reload is only available when watching directories")]
    NotWatching,
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ingest(_) | ApiError::UnknownFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::NotWatching => StatusCode::CONFLICT,
            ApiError::Export(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, error = %self, "request failed");
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// === Request/Response types ===

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadResponse {
    summary: GraphSummary,
    skipped: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse {
    viewport: ViewportState,
    selection: Selection,
    frame: ViewFrame,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectRequest {
    node_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    project_name: String,
    watch_dirs: Vec<String>,
    layout: LayoutConfig,
}

// === Handlers ===

/// GET /api/health - Health check with version
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/records - Loaded records and skipped entries
async fn records(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.batch.read().await.clone())
}

/// PUT /api/records - Replace the batch with an uploaded document
async fn replace_records(
    State(state): State<Arc<AppState>>,
    Json(document): Json<serde_json::Value>,
) -> Result<Json<LoadResponse>, ApiError> {
    let batch = parse_batch_value(document)?;
    let skipped = batch.skipped.len();
    state.replace_batch(batch).await;

    let summary = state.view.read().await.model().summary();
    Ok(Json(LoadResponse { summary, skipped }))
}

/// POST /api/records - Append an uploaded document after the loaded records
async fn append_records(
    State(state): State<Arc<AppState>>,
    Json(document): Json<serde_json::Value>,
) -> Result<Json<LoadResponse>, ApiError> {
    let next = parse_batch_value(document)?;
    let skipped = state.append_batch(next).await?;

    let summary = state.view.read().await.model().summary();
    Ok(Json(LoadResponse { summary, skipped }))
}

/// POST /api/reload - Re-read the watched directories
async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<LoadResponse>, ApiError> {
    if state.config.watch_dirs.is_empty() {
        return Err(ApiError::NotWatching);
    }
    state.reload_batches().await?;

    let summary = state.view.read().await.model().summary();
    let skipped = state.batch.read().await.skipped.len();
    Ok(Json(LoadResponse { summary, skipped }))
}

/// GET /api/graph - Built graph model
async fn graph(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.view.read().await.model().clone())
}

/// GET /api/view - Viewport, selection and the frame to draw
async fn view(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    let view = state.view.read().await;
    Json(ViewResponse {
        viewport: view.viewport(),
        selection: view.selection().clone(),
        frame: view.frame(),
    })
}

/// POST /api/select - Click a node
async fn select(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectRequest>,
) -> Json<ViewResponse> {
    state.view.write().await.click(&payload.node_id);
    view(State(state)).await
}

/// DELETE /api/select - Clear the selection
async fn clear_selection(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    state.view.write().await.clear_selection();
    view(State(state)).await
}

/// GET /api/export/{format} - Export the current graph
async fn export(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::from_name(&format).ok_or(ApiError::UnknownFormat(format))?;
    let naming = ExportNaming::new(state.config.project_name.clone());
    let view = state.view.read().await;

    let body = match format {
        ExportFormat::Json { compact } => export_json(view.model(), compact)?.into_bytes(),
        ExportFormat::Mermaid => export_mermaid(view.model()).into_bytes(),
        ExportFormat::Html => {
            export_html(&view, &state.config.project_name, naming.exported_at()).into_bytes()
        }
        ExportFormat::CsvBundle => export_csv_bundle(view.model())?,
    };

    let disposition = format!("attachment; filename=\"{}\"", naming.filename(format));
    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/config - Get server configuration
async fn config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        project_name: state.config.project_name.clone(),
        watch_dirs: state
            .config
            .watch_dirs
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        layout: state.config.layout.clone(),
    })
}
