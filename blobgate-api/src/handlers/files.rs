// Copyright 2026 Blobgate Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! File operation handlers.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use blobgate_core::{BlobInfo, FileServiceError, Principal, UploadCandidate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::server::AppState;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Message returned with a successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully.";

/// Body of a successful upload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadResponse {
    /// URL of the stored blob.
    pub blob_uri: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Query parameters for download.
#[derive(Debug, Deserialize, Default)]
pub struct DownloadQuery {
    /// Blob to read.
    #[serde(rename = "blobName")]
    pub blob_name: Option<String>,
}

/// `POST /api/FileManager/upload` (multipart, field `file`).
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let candidate = read_file_field(&mut multipart).await?;

    let blob_uri = state.service.upload_file(candidate, &principal).await?;

    Ok(Json(UploadResponse {
        blob_uri,
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
    }))
}

/// Reads the `file` field; other fields are skipped.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadCandidate>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(multipart_error)?;

        let mut candidate = UploadCandidate::new(file_name, content);
        candidate.content_type = content_type;
        return Ok(Some(candidate));
    }
    Ok(None)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Request body exceeds the maximum allowed size.".to_string())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// `GET /api/FileManager/list`
pub async fn list_files(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<BlobInfo>>, ApiError> {
    Ok(Json(state.service.list_files(&principal).await?))
}

/// `GET /api/FileManager/download?blobName=`
///
/// Returns the blob as `application/octet-stream` with the requested name
/// as the attachment file name.
pub async fn download_file(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let blob_name = query.blob_name.unwrap_or_default();
    let disposition = HeaderValue::from_str(&format!("attachment; filename={blob_name}"))
        .map_err(|_| {
            FileServiceError::InvalidArgument("Blob name contains invalid characters.".to_string())
        })?;

    let content = state.service.download_file(&blob_name, &principal).await?;
    let content = content.into_inner();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(content),
    )
        .into_response())
}
