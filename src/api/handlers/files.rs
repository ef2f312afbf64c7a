use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Redirect, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::{absolute_url, encode_segment};
use crate::api::response::{ApiError, JSend};
use crate::classify::{classify, Classification, ContentCategory};
use crate::delivery::{serve_object, ServeError, ServeRequest};
use crate::ids;
use crate::object_store::ObjectStoreError;
use crate::storage::models::FileRecord;
use crate::AppState;

/// Text objects at or above this size are not inlined into the view model.
const INLINE_TEXT_LIMIT: u64 = 1024 * 1024;

// ============================================================================
// Types
// ============================================================================

/// Share page for a freshly uploaded file.
#[derive(Debug, Serialize)]
pub struct FileView {
    pub file_name: String,
    pub view_url: String,
    pub download_url: String,
    /// Absolute view URL encoded in the QR code
    pub share_url: String,
    /// Base64 PNG
    pub qr_code: String,
}

/// Data for an embedded player or viewer.
#[derive(Debug, Serialize)]
pub struct MediaView {
    pub file_name: String,
    pub content_type: String,
    pub category: ContentCategory,
    pub stream_url: String,
    pub download_url: String,
    pub text_content: Option<String>,
}

/// A file id resolved against the registry.
#[derive(Debug)]
struct ResolvedFile {
    id: String,
    /// Key in backing storage
    key: String,
    /// Original name when tracked, otherwise the raw id
    file_name: String,
    classification: Classification,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::bad_request(format!("Invalid upload: {}", e.body_text())))?;

    let mut upload: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::bad_request("file field must carry a filename"))?;

        let data = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large(format!(
                    "File exceeds maximum upload size of {} bytes",
                    state.config.max_upload_size
                ))
            } else {
                ApiError::bad_request(format!("Failed to read file: {e}"))
            }
        })?;

        if data.len() as u64 > state.config.max_upload_size {
            return Err(ApiError::payload_too_large(format!(
                "File exceeds maximum upload size of {} bytes",
                state.config.max_upload_size
            )));
        }

        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| ApiError::bad_request("file field is required"))?;

    let id = ids::new_file_id(&file_name)
        .ok_or_else(|| ApiError::bad_request(format!("Unusable filename {file_name:?}")))?;

    state
        .object_store
        .put(&id, data)
        .await
        .map_err(|e| {
            tracing::error!(file_id = %id, error = %e, "Failed to store upload");
            match e {
                ObjectStoreError::AlreadyExists(_) => ApiError::internal("Upload id collision, retry"),
                _ => ApiError::internal("Cannot save file"),
            }
        })?;

    state.files.put(FileRecord::new(id.clone(), file_name.clone()));

    tracing::info!(file_id = %id, original_name = %file_name, "Stored upload");
    Ok(Redirect::to(&format!("/file/{}", encode_segment(&id))))
}

/// Wrong method on the upload route.
pub async fn upload_method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}

pub async fn file_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<JSend<FileView>>, ApiError> {
    let file = resolve(&state, &id)?;
    ensure_present(&state, &file).await?;

    let view_url = format!("/view/{}", encode_segment(&file.id));
    let share_url = absolute_url(&state, &headers, &view_url);
    let qr_code = state.qr.encode_base64(&share_url).map_err(|e| {
        tracing::error!(file_id = %file.id, error = %e, "QR code generation failed");
        ApiError::internal("Failed to generate QR code")
    })?;

    Ok(JSend::success(FileView {
        download_url: format!("/download/{}", encode_segment(&file.id)),
        file_name: file.file_name,
        view_url,
        share_url,
        qr_code,
    }))
}

pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<MediaView>>, ApiError> {
    let file = resolve(&state, &id)?;
    ensure_present(&state, &file).await?;

    let text_content = if file.classification.category == ContentCategory::Text {
        match state.object_store.read_small(&file.key, INLINE_TEXT_LIMIT).await {
            Ok(data) => data.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!(file_id = %file.id, error = %e, "Failed to read text content");
                None
            }
        }
    } else {
        None
    };

    Ok(JSend::success(MediaView {
        content_type: file.classification.mime_type.to_string(),
        category: file.classification.category,
        stream_url: format!("/stream/{}", encode_segment(&file.id)),
        download_url: format!("/download/{}", encode_segment(&file.id)),
        file_name: file.file_name,
        text_content,
    }))
}

/// Raw bytes with inline disposition, for players and viewers.
pub async fn stream_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    deliver(&state, &id, &headers, true).await
}

/// Raw bytes as an attachment.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    deliver(&state, &id, &headers, false).await
}

// ============================================================================
// Helpers
// ============================================================================

/// Map a requested id to a storage key and display name.
///
/// Untracked objects placed directly in the upload directory still resolve,
/// named and classified by their raw id.
fn resolve(state: &AppState, raw_id: &str) -> Result<ResolvedFile, ApiError> {
    let id = ids::sanitize_name(raw_id).ok_or_else(|| ApiError::not_found("File not found"))?;

    let (key, file_name) = match state.files.get(id) {
        Some(record) => (record.stored_name, record.original_name),
        None => (id.to_string(), id.to_string()),
    };

    Ok(ResolvedFile {
        id: id.to_string(),
        classification: classify(&file_name),
        key,
        file_name,
    })
}

async fn ensure_present(state: &AppState, file: &ResolvedFile) -> Result<(), ApiError> {
    match state.object_store.exists(&file.key).await {
        Ok(true) => Ok(()),
        Ok(false) | Err(ObjectStoreError::InvalidKey(_)) => {
            tracing::debug!(file_id = %file.id, "File not present in storage");
            Err(ApiError::not_found("File not found"))
        }
        Err(e) => {
            tracing::error!(file_id = %file.id, error = %e, "Failed to check storage");
            Err(ApiError::internal("Failed to read file"))
        }
    }
}

async fn deliver(
    state: &AppState,
    raw_id: &str,
    headers: &HeaderMap,
    inline: bool,
) -> Result<Response, ApiError> {
    let file = resolve(state, raw_id)?;
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    let request = ServeRequest {
        key: &file.key,
        declared_name: &file.file_name,
        mime_type: file.classification.mime_type,
        inline,
        range,
    };

    serve_object(state.object_store.as_ref(), request)
        .await
        .map_err(|e| match e {
            ServeError::NotFound(_) => {
                tracing::debug!(file_id = %file.id, "File not found");
                ApiError::not_found("File not found")
            }
            ServeError::Storage(e) => {
                tracing::error!(file_id = %file.id, error = %e, "Failed to open file");
                ApiError::internal("Failed to read file")
            }
        })
}
