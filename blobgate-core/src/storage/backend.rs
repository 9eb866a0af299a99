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

//! Blob backend capability trait.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::BackendError;

/// Capabilities the gateway needs from an object store.
///
/// One instance is created at startup and shared by every request, so
/// implementations must be safe for concurrent use and must not hold
/// in-process locks across network I/O.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Creates `container` unless it already exists.
    async fn create_container_if_not_exists(&self, container: &str) -> Result<(), BackendError>;

    /// Returns true if `container` exists.
    async fn container_exists(&self, container: &str) -> Result<bool, BackendError>;

    /// Writes a blob, replacing any blob with the same name.
    ///
    /// # Arguments
    ///
    /// * `container` - Existing container
    /// * `blob_name` - Blob name within the container
    /// * `content_type` - MIME type stored with the blob
    /// * `data` - Blob content
    async fn upload_blob(
        &self,
        container: &str,
        blob_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError>;

    /// Lists every blob name in `container`, draining any pagination.
    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, BackendError>;

    /// Returns true if the blob exists.
    async fn blob_exists(&self, container: &str, blob_name: &str) -> Result<bool, BackendError>;

    /// Reads a whole blob.
    async fn download_blob(&self, container: &str, blob_name: &str) -> Result<Bytes, BackendError>;

    /// Absolute URL addressing the blob. Performs no I/O.
    fn blob_url(&self, container: &str, blob_name: &str) -> Result<Url, BackendError>;
}

/// Appends `container/blob_name` to an endpoint, percent-encoding each segment.
pub(crate) fn join_blob_url(
    endpoint: &Url,
    container: &str,
    blob_name: Option<&str>,
) -> Result<Url, BackendError> {
    let mut url = endpoint.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            BackendError::Configuration(format!("endpoint cannot be a base URL: {endpoint}"))
        })?;
        segments.pop_if_empty().push(container);
        if let Some(name) = blob_name {
            segments.push(name);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_blob_url() {
        let endpoint = Url::parse("https://acct.blob.core.windows.net").unwrap();
        let url = join_blob_url(&endpoint, "c-container", Some("a b.txt")).unwrap();
        assert_eq!(url.as_str(), "https://acct.blob.core.windows.net/c-container/a%20b.txt");
    }

    #[test]
    fn test_join_blob_url_path_style() {
        let endpoint = Url::parse("http://127.0.0.1:10000/devstoreaccount1/").unwrap();
        let url = join_blob_url(&endpoint, "c", None).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:10000/devstoreaccount1/c");
    }

    #[test]
    fn test_join_blob_url_rejects_non_base() {
        let endpoint = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            join_blob_url(&endpoint, "c", None),
            Err(BackendError::Configuration(_))
        ));
    }
}
