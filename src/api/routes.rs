use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Leave headroom for multipart framing around the file itself.
    let upload_limit = (state.config.max_upload_size as usize).saturating_add(64 * 1024);

    Router::new()
        .route("/", get(handlers::index))
        // Snippets
        .route("/save", post(handlers::save_snippet))
        .route("/display/:id", get(handlers::display_snippet))
        .route("/delete/:id", post(handlers::delete_snippet))
        // Files
        .route(
            "/upload",
            post(handlers::upload_file)
                .fallback(handlers::upload_method_not_allowed)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/file/:id", get(handlers::file_page))
        .route("/view/:id", get(handlers::view_file))
        .route("/stream/:id", get(handlers::stream_file))
        .route("/download/:id", get(handlers::download_file))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
