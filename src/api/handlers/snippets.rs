use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{absolute_url, encode_segment};
use crate::api::response::{ApiError, AppForm, JSend};
use crate::storage::models::Snippet;
use crate::storage::StoreError;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SaveSnippetForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// `"true"` when the burn-after-reading checkbox is ticked
    #[serde(default)]
    pub burn: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnippetView {
    pub id: String,
    pub title: String,
    pub text: String,
    pub burn_after_reading: bool,
    pub link: String,
    pub share_url: String,
    /// Base64 PNG of `share_url`; absent if encoding failed
    pub qr_code: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn save_snippet(
    State(state): State<Arc<AppState>>,
    AppForm(form): AppForm<SaveSnippetForm>,
) -> Result<Redirect, ApiError> {
    let burn = form.burn.as_deref() == Some("true");
    let snippet = state
        .snippets
        .insert_new(Snippet::new(&form.title, form.text, burn))
        .map_err(|e| match e {
            StoreError::Full(count) => {
                tracing::warn!(snippets = count, "Snippet store is full");
                ApiError::unavailable("Too many snippets, delete some and retry")
            }
        })?;

    state.persist_snippets().await;

    tracing::debug!(snippet_id = %snippet.id, burn, "Saved snippet");
    Ok(Redirect::to(&format!("/display/{}", snippet.id)))
}

/// Show a snippet, or send the client home if it does not exist.
///
/// Burn-after-reading snippets are removed by the same store operation that
/// reads them, so only one request ever renders them.
pub async fn display_snippet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(snippet) = state.snippets.consume_if_burn(&id) else {
        return Redirect::to("/").into_response();
    };

    let link = format!("/display/{}", encode_segment(&snippet.id));
    let share_url = absolute_url(&state, &headers, &link);
    let qr_code = match state.qr.encode_base64(&share_url) {
        Ok(code) => Some(code),
        Err(e) => {
            tracing::warn!(snippet_id = %snippet.id, error = %e, "QR code generation failed");
            None
        }
    };

    if snippet.burn_after_reading {
        tracing::debug!(snippet_id = %snippet.id, "Burned snippet after reading");
        state.persist_snippets().await;
    }

    JSend::success(SnippetView {
        id: snippet.id,
        title: snippet.title,
        text: snippet.text,
        burn_after_reading: snippet.burn_after_reading,
        link,
        share_url,
        qr_code,
    })
    .into_response()
}

pub async fn delete_snippet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Redirect {
    if state.snippets.delete(&id) {
        tracing::debug!(snippet_id = %id, "Deleted snippet");
    }
    state.persist_snippets().await;
    Redirect::to("/")
}
