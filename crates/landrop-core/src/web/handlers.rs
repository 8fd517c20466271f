//! HTTP endpoint handlers for uploads, listing, and downloads.

#![allow(clippy::missing_errors_doc)]

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use axum_extra::extract::Multipart;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::store::{self, FileDescriptor};

use super::error::{ApiError, ApiResult};
use super::state::SharedState;

/// Multipart field names the upload endpoint understands.
const FILE_FIELD: &str = "file";
const TARGET_FIELD: &str = "targetUserId";
const FROM_FIELD: &str = "fromUserId";

/// POST /upload - Persist an uploaded file and notify the target peer.
///
/// The `file` field is required; `targetUserId` and `fromUserId` are
/// optional. Notification delivery is fire-and-forget: the response carries
/// the descriptor whether or not the target was reachable.
pub async fn upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> ApiResult<Json<FileDescriptor>> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut target_user_id: Option<String> = None;
    let mut from_user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read multipart field: {e}")))?
    {
        match field.name() {
            Some(FILE_FIELD) => {
                let raw_name = field
                    .file_name()
                    .map(ToString::to_string)
                    .ok_or_else(|| ApiError::bad_request("file field is missing a filename"))?;
                let name = store::decode_transport_filename(&raw_name);

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read file data: {e}")))?;

                upload = Some((name, data.to_vec()));
            }
            Some(TARGET_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid target id: {e}")))?;
                target_user_id = Some(value);
            }
            Some(FROM_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid sender id: {e}")))?;
                from_user_id = Some(value);
            }
            _ => {}
        }
    }

    let Some((name, data)) = upload else {
        return Err(crate::Error::MissingFile.into());
    };

    let descriptor = state.store.save(&name, &data).await.map_err(ApiError::from)?;

    state
        .dispatcher
        .notify_file_ready(
            descriptor.clone(),
            target_user_id.as_deref().filter(|t| !t.is_empty()),
            from_user_id.as_deref().filter(|f| !f.is_empty()),
        )
        .await;

    Ok(Json(descriptor))
}

/// GET /files - List every persisted upload.
pub async fn list_files(State(state): State<SharedState>) -> ApiResult<Json<Vec<FileDescriptor>>> {
    let descriptors = state.store.list().await.map_err(ApiError::from)?;
    Ok(Json(descriptors))
}

/// GET /uploads/{name} - Download a stored blob.
///
/// Served with the content type from the fixed extension table and forced as
/// an attachment so browsers download rather than render.
pub async fn download(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let (blob_path, size) = state.store.open(&name).await.map_err(ApiError::from)?;

    let file = File::open(&blob_path)
        .await
        .map_err(|e| ApiError::internal(format!("failed to open blob: {e}")))?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, store::content_type_for(&name))
        .header(header::CONTENT_DISPOSITION, "attachment")
        .header(header::CONTENT_LENGTH, size)
        .body(body)
        .unwrap())
}
