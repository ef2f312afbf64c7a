mod files;
mod index;
mod snippets;

use std::borrow::Cow;

use axum::http::{header, HeaderMap};

use crate::AppState;

pub use files::{
    download_file, file_page, stream_file, upload_file, upload_method_not_allowed, view_file,
    FileView, MediaView,
};
pub use index::{health, index, FileEntry, HealthResponse, IndexView, SnippetSummary};
pub use snippets::{delete_snippet, display_snippet, save_snippet, SaveSnippetForm, SnippetView};

/// Percent-encode an id for use as one path segment.
fn encode_segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Absolute URL for `path`, used in share links and QR codes.
///
/// Prefers the configured public base URL; otherwise trusts the request's
/// Host header, falling back to the bind address.
fn absolute_url(state: &AppState, headers: &HeaderMap, path: &str) -> String {
    if let Some(ref base) = state.config.server.public_base_url {
        return format!("{base}{path}");
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or(state.config.server.bind_address.as_str());
    format!("http://{host}{path}")
}
