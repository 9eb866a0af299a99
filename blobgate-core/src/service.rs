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

//! File management orchestrator.
//!
//! Composes container resolution, the upload policy gate and the blob
//! repository into the three user-facing operations.

use std::io::Cursor;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{FileServiceError, UploadRejection};
use crate::identity::Principal;
use crate::policy::{extension_of, UploadPolicy};
use crate::storage::BlobRepository;
use crate::types::{BlobInfo, UploadCandidate};

/// Content type stored when the client sent none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload, list and download on behalf of an authenticated principal.
#[derive(Clone)]
pub struct FileManagementService {
    repository: BlobRepository,
    policy: UploadPolicy,
}

impl FileManagementService {
    /// Creates a service over a repository and upload policy.
    pub fn new(repository: BlobRepository, policy: UploadPolicy) -> Self {
        Self { repository, policy }
    }

    /// Upload policy in effect.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validates and stores a file in the principal's container.
    ///
    /// The blob is named with a fresh UUID followed by the original
    /// extension, so repeated uploads of the same file never overwrite each
    /// other. Returns the blob URL.
    ///
    /// # Errors
    ///
    /// * `FileServiceError::InvalidFile` - the policy gate refused the file
    /// * `FileServiceError::Storage` - the backend failed
    pub async fn upload_file(
        &self,
        candidate: Option<UploadCandidate>,
        principal: &Principal,
    ) -> Result<String, FileServiceError> {
        let container = principal.container();

        let candidate = match candidate {
            Some(candidate) => candidate,
            None => return Err(reject(None, UploadRejection::EmptyOrMissingFile, principal)),
        };
        if let Err(reason) = self.policy.validate(Some(&candidate)) {
            return Err(reject(Some(candidate.file_name), reason, principal));
        }

        let blob_name = format!("{}{}", Uuid::new_v4(), extension_of(&candidate.file_name));
        let content_type = candidate
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let size = candidate.size_bytes;

        let url = self
            .repository
            .put(&container, &blob_name, content_type, candidate.content)
            .await?;

        metrics::counter!("blobgate_uploads_total").increment(1);
        metrics::counter!("blobgate_upload_bytes_total").increment(size);

        info!(
            "File uploaded: subject={}, original={}, blob={}, size={}",
            principal.subject_label(),
            candidate.file_name,
            blob_name,
            size
        );
        Ok(url)
    }

    /// Lists the principal's files. Empty if nothing was ever uploaded.
    pub async fn list_files(&self, principal: &Principal) -> Result<Vec<BlobInfo>, FileServiceError> {
        let container = principal.container();
        let files = self.repository.list(&container).await?;
        info!(
            "Listed {} file(s) for {}",
            files.len(),
            principal.subject_label()
        );
        Ok(files)
    }

    /// Reads one of the principal's files.
    ///
    /// # Errors
    ///
    /// * `FileServiceError::InvalidArgument` - `blob_name` is blank
    /// * `FileServiceError::Storage` - not found, or the backend failed
    pub async fn download_file(
        &self,
        blob_name: &str,
        principal: &Principal,
    ) -> Result<Cursor<Bytes>, FileServiceError> {
        if blob_name.trim().is_empty() {
            return Err(FileServiceError::InvalidArgument(
                "Blob name cannot be null or empty.".to_string(),
            ));
        }

        let container = principal.container();
        let content = self.repository.get(&container, blob_name).await?;
        info!(
            "File downloaded: subject={}, blob={}",
            principal.subject_label(),
            blob_name
        );
        Ok(content)
    }
}

fn reject(
    file_name: Option<String>,
    reason: UploadRejection,
    principal: &Principal,
) -> FileServiceError {
    warn!(
        "Upload rejected for {}: {}",
        principal.subject_label(),
        reason
    );
    FileServiceError::InvalidFile { file_name, reason }
}
