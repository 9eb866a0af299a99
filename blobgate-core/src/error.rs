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

//! Error types for blob storage and file management.
//!
//! Each error is constructed once, at the layer that first detects it:
//! backends produce [`BackendError`], the repository turns those into
//! [`StorageError`], and the file management service adds
//! [`UploadRejection`] / argument failures on top via [`FileServiceError`].

use thiserror::Error;

/// Raw failure reported by a blob backend.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    /// The blob service answered with a non-success status.
    #[error("blob service returned {status}{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Status {
        /// HTTP status code.
        status: u16,
        /// Service error code (e.g. `ContainerNotFound`).
        code: Option<String>,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The backend is misconfigured (bad endpoint, undecodable key).
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Returns true when the backend reported the addressed resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Status { status: 404, .. })
    }
}

/// Errors surfaced by the blob repository.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Blob does not exist in the caller's container.
    #[error("Blob '{blob_name}' not found in container '{container_name}'.")]
    NotFound {
        /// Requested blob name.
        blob_name: String,
        /// Container that was searched.
        container_name: String,
    },

    /// Any other backend failure (network, permission, throttling).
    #[error("{context}")]
    Unavailable {
        /// Operation that failed, safe to show to clients.
        context: String,
        /// Underlying backend failure, for server-side diagnostics.
        #[source]
        source: BackendError,
    },
}

/// Reasons an upload candidate is refused before any storage call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    /// No file was supplied, or it has no content.
    #[error("File is empty or null.")]
    EmptyOrMissingFile,

    /// File exceeds the size ceiling.
    #[error("File size {size} bytes exceeds the maximum allowed size of {limit} bytes.")]
    FileTooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Extension missing or not on the allow-list.
    #[error("File type '{extension}' is not permitted. Allowed types: {}.", .permitted.join(", "))]
    ExtensionNotPermitted {
        /// Rejected extension (lower-cased, with leading dot; empty if none).
        extension: String,
        /// Allow-list in effect.
        permitted: Vec<String>,
    },
}

/// Errors returned by [`crate::FileManagementService`].
#[derive(Error, Debug)]
pub enum FileServiceError {
    /// Upload refused by the policy gate.
    #[error("{reason}")]
    InvalidFile {
        /// Original file name, when a file was supplied.
        file_name: Option<String>,
        /// Why the file was refused.
        reason: UploadRejection,
    },

    /// A request argument is blank or malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// Repository failure, passed through as first typed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
