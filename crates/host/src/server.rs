//! HTTP routes: the workbench descriptor plus static files

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use folderbridge_protocol::WorkspaceConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Path the page fetches its config from
pub const DESCRIPTOR_PATH: &str = "/workbench.json";

#[derive(Clone)]
pub struct AppState {
    pub descriptor: Arc<WorkspaceConfig>,
}

/// Serve the descriptor, never cached so edits show on reload
async fn serve_descriptor(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(state.descriptor.as_ref().clone()),
    )
}

pub fn router(descriptor: WorkspaceConfig, dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        descriptor: Arc::new(descriptor),
    };

    Router::new()
        .route(DESCRIPTOR_PATH, get(serve_descriptor))
        .fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        .with_state(state)
        .layer(cors)
}
