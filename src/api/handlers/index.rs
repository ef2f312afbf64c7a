use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::JSend;
use crate::AppState;

/// Snippets listed on the home page.
const INDEX_SNIPPET_LIMIT: usize = 10;

/// Characters of snippet text shown before truncation.
const PREVIEW_CHARS: usize = 10;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct IndexView {
    pub snippets: Vec<SnippetSummary>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
pub struct SnippetSummary {
    pub id: String,
    pub title: String,
    pub truncated_text: String,
}

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn index(State(state): State<Arc<AppState>>) -> Json<JSend<IndexView>> {
    let snippets = state
        .snippets
        .list()
        .into_iter()
        .take(INDEX_SNIPPET_LIMIT)
        .map(|s| SnippetSummary {
            truncated_text: truncate(&s.text),
            id: s.id,
            title: s.title,
        })
        .collect();

    // The directory is authoritative; the registry only supplies names.
    let files = match state.object_store.list().await {
        Ok(keys) => keys
            .into_iter()
            .map(|id| FileEntry {
                name: state
                    .files
                    .get(&id)
                    .map(|r| r.original_name)
                    .unwrap_or_else(|| id.clone()),
                id,
            })
            .collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list upload directory");
            Vec::new()
        }
    };

    JSend::success(IndexView { snippets, files })
}

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
