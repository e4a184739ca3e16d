//! Viewer page rendered from the shared graph view.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use super::AppState;

pub fn viewer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .fallback(not_found)
}

/// GET / - Current view as a standalone page
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = state.view.read().await;
    Html(querygraph_export::export_html(
        &view,
        &state.config.project_name,
        chrono::Utc::now(),
    ))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
