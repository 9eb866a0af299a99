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

//! Container-scoped object store adapter.
//!
//! Wraps a [`BlobBackend`] and turns its failures into [`StorageError`]:
//! absence of a requested blob becomes `NotFound`, everything else becomes
//! `Unavailable` with the operation as context.

use bytes::Bytes;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::backend::BlobBackend;
use crate::error::{BackendError, StorageError};
use crate::types::{BlobInfo, ContainerName};

/// Put/list/get over per-subject containers.
///
/// Cloning is cheap; all clones share the same backend.
#[derive(Clone)]
pub struct BlobRepository {
    backend: Arc<dyn BlobBackend>,
}

impl BlobRepository {
    /// Creates a repository over a shared backend.
    pub fn new(backend: Arc<dyn BlobBackend>) -> Self {
        Self { backend }
    }

    /// Writes `data` as `blob_name`, creating the container first if needed.
    ///
    /// Returns the absolute URL of the stored blob.
    pub async fn put(
        &self,
        container: &ContainerName,
        blob_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, StorageError> {
        let size = data.len();

        self.backend
            .create_container_if_not_exists(container.as_str())
            .await
            .map_err(|e| unavailable(format!("Failed to create container '{container}'."), e))?;

        self.backend
            .upload_blob(container.as_str(), blob_name, content_type, data)
            .await
            .map_err(|e| {
                unavailable(
                    format!("Failed to upload blob '{blob_name}' to container '{container}'."),
                    e,
                )
            })?;

        let url = self
            .backend
            .blob_url(container.as_str(), blob_name)
            .map_err(|e| unavailable(format!("Failed to build URL for blob '{blob_name}'."), e))?;

        info!(
            "Blob stored: container={}, blob={}, size={}",
            container, blob_name, size
        );
        Ok(url.to_string())
    }

    /// Lists every blob in `container`.
    ///
    /// A container that does not exist yet yields an empty list.
    pub async fn list(&self, container: &ContainerName) -> Result<Vec<BlobInfo>, StorageError> {
        let context = || format!("Failed to list blobs in container '{container}'.");

        let exists = self
            .backend
            .container_exists(container.as_str())
            .await
            .map_err(|e| unavailable(context(), e))?;
        if !exists {
            debug!("Container {} does not exist, returning empty listing", container);
            return Ok(Vec::new());
        }

        let names = self
            .backend
            .list_blobs(container.as_str())
            .await
            .map_err(|e| unavailable(context(), e))?;

        names
            .into_iter()
            .map(|name| {
                let url = self
                    .backend
                    .blob_url(container.as_str(), &name)
                    .map_err(|e| unavailable(context(), e))?;
                Ok(BlobInfo {
                    name,
                    url: url.to_string(),
                })
            })
            .collect()
    }

    /// Reads `blob_name` fully into a seekable buffer positioned at its start.
    pub async fn get(
        &self,
        container: &ContainerName,
        blob_name: &str,
    ) -> Result<Cursor<Bytes>, StorageError> {
        let context = || format!("Failed to download blob '{blob_name}' from container '{container}'.");

        let exists = self
            .backend
            .blob_exists(container.as_str(), blob_name)
            .await
            .map_err(|e| unavailable(context(), e))?;
        if !exists {
            return Err(not_found(container, blob_name));
        }

        match self.backend.download_blob(container.as_str(), blob_name).await {
            Ok(data) => {
                debug!(
                    "Blob read: container={}, blob={}, size={}",
                    container,
                    blob_name,
                    data.len()
                );
                Ok(Cursor::new(data))
            }
            // Deleted between the existence check and the read.
            Err(e) if e.is_not_found() => Err(not_found(container, blob_name)),
            Err(e) => Err(unavailable(context(), e)),
        }
    }
}

fn not_found(container: &ContainerName, blob_name: &str) -> StorageError {
    StorageError::NotFound {
        blob_name: blob_name.to_string(),
        container_name: container.to_string(),
    }
}

fn unavailable(context: String, source: BackendError) -> StorageError {
    error!("{} Cause: {}", context, source);
    StorageError::Unavailable { context, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn repository() -> BlobRepository {
        BlobRepository::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn test_put_creates_container_and_returns_url() {
        let repo = repository();
        let container = ContainerName::for_subject("alice");

        let url = repo
            .put(&container, "k.txt", "text/plain", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert_eq!(url, "http://127.0.0.1:10000/devstoreaccount1/alice-container/k.txt");

        let listed = repo.list(&container).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "k.txt");
        assert_eq!(listed[0].url, url);
    }

    #[tokio::test]
    async fn test_list_missing_container_is_empty() {
        let repo = repository();
        let listed = repo.list(&ContainerName::for_subject("nobody")).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_blob() {
        let repo = repository();
        let container = ContainerName::for_subject("bob");
        repo.put(&container, "a.csv", "text/csv", Bytes::from_static(b"1,2"))
            .await
            .unwrap();

        match repo.get(&container, "b.csv").await {
            Err(StorageError::NotFound {
                blob_name,
                container_name,
            }) => {
                assert_eq!(blob_name, "b.csv");
                assert_eq!(container_name, "bob-container");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_returns_cursor_at_start() {
        let repo = repository();
        let container = ContainerName::for_subject("carol");
        repo.put(&container, "d.json", "application/json", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        let cursor = repo.get(&container, "d.json").await.unwrap();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.into_inner(), Bytes::from_static(b"{}"));
    }
}
