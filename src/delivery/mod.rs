//! Range-aware delivery of stored objects over HTTP.

mod range;

pub use range::ByteRange;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use futures::TryStreamExt;
use thiserror::Error;
use tokio_util::io::ReaderStream;

use crate::object_store::{ObjectStore, ObjectStoreError};

/// Lifetime advertised for successful full and partial responses.
pub const CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(ObjectStoreError),
}

impl From<ObjectStoreError> for ServeError {
    fn from(e: ObjectStoreError) -> Self {
        match e {
            ObjectStoreError::NotFound(key) | ObjectStoreError::InvalidKey(key) => {
                ServeError::NotFound(key)
            }
            other => ServeError::Storage(other),
        }
    }
}

/// What to deliver and how to label it.
#[derive(Debug, Clone, Copy)]
pub struct ServeRequest<'a> {
    /// Key of the object in backing storage
    pub key: &'a str,
    /// Filename advertised in `Content-Disposition`
    pub declared_name: &'a str,
    pub mime_type: &'a str,
    /// `inline` for in-browser playback, `attachment` for downloads
    pub inline: bool,
    /// Raw `Range` header, if any
    pub range: Option<&'a str>,
}

/// Stream an object, honoring a single-span `Range` header.
///
/// An unsatisfiable range is not an error: the whole object is sent with 200.
pub async fn serve_object(
    store: &dyn ObjectStore,
    request: ServeRequest<'_>,
) -> Result<Response, ServeError> {
    let size = store.size(request.key).await?;

    let (status, start, len) = match ByteRange::parse(request.range, size) {
        ByteRange::Partial { start, end } => (StatusCode::PARTIAL_CONTENT, start, end - start + 1),
        ByteRange::Full => (StatusCode::OK, 0, size),
        ByteRange::Unsatisfiable => {
            tracing::debug!(
                key = %request.key,
                range = ?request.range,
                "Unsatisfiable range, sending full object"
            );
            (StatusCode::OK, 0, size)
        }
    };

    let reader = store.open_range(request.key, start, len).await?;
    let body = Body::from_stream(tracked_stream(request.key, reader, len));

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(request.mime_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(request.inline, request.declared_name),
    );
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));

    if status == StatusCode::PARTIAL_CONTENT {
        let end = start + len - 1;
        let content_range = format!("bytes {start}-{end}/{size}");
        if let Ok(value) = HeaderValue::from_str(&content_range) {
            headers.insert(header::CONTENT_RANGE, value);
        }
        tracing::debug!(key = %request.key, start, end, size, "Serving range");
    } else {
        tracing::debug!(key = %request.key, size, inline = request.inline, "Serving object");
    }

    Ok(response)
}

fn content_disposition(inline: bool, filename: &str) -> HeaderValue {
    let kind = if inline { "inline" } else { "attachment" };
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_bytes(format!("{kind}; filename=\"{escaped}\"").as_bytes())
        .unwrap_or(HeaderValue::from_static(if inline { "inline" } else { "attachment" }))
}

/// Logs read failures and early drops (client went away) without failing the
/// handler.
fn tracked_stream(
    key: &str,
    reader: crate::object_store::ObjectReader,
    len: u64,
) -> impl futures::Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    let key_for_errors = key.to_string();
    let mut progress = StreamProgress {
        key: key.to_string(),
        remaining: len,
    };
    ReaderStream::new(reader)
        .inspect_ok(move |chunk| {
            progress.remaining = progress.remaining.saturating_sub(chunk.len() as u64);
        })
        .inspect_err(move |e| {
            tracing::warn!(key = %key_for_errors, error = %e, "Read failed mid-stream");
        })
}

struct StreamProgress {
    key: String,
    remaining: u64,
}

impl Drop for StreamProgress {
    fn drop(&mut self) {
        if self.remaining > 0 {
            tracing::info!(
                key = %self.key,
                remaining = self.remaining,
                "Stream ended before the body was fully sent"
            );
        }
    }
}
