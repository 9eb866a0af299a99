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

//! In-process blob backend for development and tests.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::backend::{join_blob_url, BlobBackend};
use crate::error::BackendError;

/// Default URL prefix, matching the local storage emulator layout.
pub const DEFAULT_MEMORY_BASE_URL: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Blob backend holding everything in memory. Content types are not
/// retained and contents vanish on drop.
#[derive(Debug)]
pub struct MemoryBackend {
    base_url: Url,
    containers: RwLock<HashMap<String, BTreeMap<String, Bytes>>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_MEMORY_BASE_URL).expect("default base URL is valid"),
            containers: RwLock::new(HashMap::new()),
        }
    }
}

impl MemoryBackend {
    /// Creates an empty backend with the default base URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend whose blob URLs start with `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Configuration(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Configuration(format!(
                "base URL cannot carry paths: {base_url}"
            )));
        }
        Ok(Self {
            base_url,
            containers: RwLock::new(HashMap::new()),
        })
    }

    /// Number of blobs in `container` (0 if the container does not exist).
    pub async fn blob_count(&self, container: &str) -> usize {
        self.containers.read().await.get(container).map_or(0, BTreeMap::len)
    }
}

fn blob_not_found(container: &str, blob_name: &str) -> BackendError {
    BackendError::Status {
        status: 404,
        code: Some("BlobNotFound".to_string()),
        message: format!("{container}/{blob_name} does not exist"),
    }
}

fn container_not_found(container: &str) -> BackendError {
    BackendError::Status {
        status: 404,
        code: Some("ContainerNotFound".to_string()),
        message: format!("{container} does not exist"),
    }
}

#[async_trait]
impl BlobBackend for MemoryBackend {
    async fn create_container_if_not_exists(&self, container: &str) -> Result<(), BackendError> {
        self.containers.write().await.entry(container.to_string()).or_default();
        Ok(())
    }

    async fn container_exists(&self, container: &str) -> Result<bool, BackendError> {
        Ok(self.containers.read().await.contains_key(container))
    }

    async fn upload_blob(
        &self,
        container: &str,
        blob_name: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError> {
        let mut containers = self.containers.write().await;
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| container_not_found(container))?;
        blobs.insert(blob_name.to_string(), data);
        Ok(())
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, BackendError> {
        let containers = self.containers.read().await;
        let blobs = containers
            .get(container)
            .ok_or_else(|| container_not_found(container))?;
        Ok(blobs.keys().cloned().collect())
    }

    async fn blob_exists(&self, container: &str, blob_name: &str) -> Result<bool, BackendError> {
        Ok(self
            .containers
            .read()
            .await
            .get(container)
            .is_some_and(|blobs| blobs.contains_key(blob_name)))
    }

    async fn download_blob(&self, container: &str, blob_name: &str) -> Result<Bytes, BackendError> {
        let containers = self.containers.read().await;
        containers
            .get(container)
            .and_then(|blobs| blobs.get(blob_name))
            .cloned()
            .ok_or_else(|| blob_not_found(container, blob_name))
    }

    fn blob_url(&self, container: &str, blob_name: &str) -> Result<Url, BackendError> {
        join_blob_url(&self.base_url, container, Some(blob_name))
    }
}
