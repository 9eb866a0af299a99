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

//! HTTP error mapping.
//!
//! Every failure leaving a handler or middleware is an [`ApiError`], which
//! renders as a JSON body with PascalCase field names.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use blobgate_core::{FileServiceError, StorageError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// Client-facing message for backend failures.
pub const STORAGE_ERROR_MESSAGE: &str = "An error occurred while accessing blob storage.";

/// Client-facing message for anything unanticipated.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Errors returned by the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// File service failure.
    #[error(transparent)]
    Service(#[from] FileServiceError),

    /// Authentication or authorization failure.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// Request body could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    /// Request body exceeds the transport limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Unanticipated failure; the message is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

/// JSON error body. Absent fields are omitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blob_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            file_name: None,
            blob_name: None,
            container_name: None,
            details: None,
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(FileServiceError::InvalidFile { .. })
            | ApiError::Service(FileServiceError::InvalidArgument(_))
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(FileServiceError::Storage(StorageError::NotFound { .. })) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Service(FileServiceError::Storage(StorageError::Unavailable { .. }))
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Service(FileServiceError::InvalidFile { file_name, reason }) => ErrorBody {
                file_name: file_name.clone(),
                ..ErrorBody::new(reason.to_string())
            },
            ApiError::Service(FileServiceError::InvalidArgument(message)) => {
                ErrorBody::new(message.clone())
            }
            ApiError::Service(FileServiceError::Storage(
                err @ StorageError::NotFound {
                    blob_name,
                    container_name,
                },
            )) => ErrorBody {
                blob_name: Some(blob_name.clone()),
                container_name: Some(container_name.clone()),
                ..ErrorBody::new(err.to_string())
            },
            ApiError::Service(FileServiceError::Storage(StorageError::Unavailable {
                context, ..
            })) => ErrorBody {
                details: Some(context.clone()),
                ..ErrorBody::new(STORAGE_ERROR_MESSAGE)
            },
            ApiError::Unauthorized(err) => ErrorBody::new(err.to_string()),
            ApiError::BadRequest(message) | ApiError::PayloadTooLarge(message) => {
                ErrorBody::new(message.clone())
            }
            ApiError::Internal(_) => ErrorBody::new(UNEXPECTED_ERROR_MESSAGE),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(message) = &self {
            error!("Unexpected error: {}", message);
        }

        let mut response = (self.status_code(), Json(self.body())).into_response();
        if let ApiError::Unauthorized(err) = &self {
            if let Ok(challenge) = HeaderValue::from_str(&err.challenge()) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, challenge);
            }
        }
        response
    }
}
