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

//! Stored blob descriptors and upload candidates.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A blob as reported to clients: its name and retrieval URL.
///
/// Serialized with PascalCase field names (`Name`, `Url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlobInfo {
    /// Blob name, unique within its container.
    pub name: String,
    /// Absolute URL of the blob.
    pub url: String,
}

/// A file supplied by a caller for upload. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// File name as sent by the client.
    pub file_name: String,
    /// Declared content size in bytes.
    pub size_bytes: u64,
    /// MIME type sent with the file, if any.
    pub content_type: Option<String>,
    /// File content.
    pub content: Bytes,
}

impl UploadCandidate {
    /// Creates a candidate whose size is the length of `content`.
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            file_name: file_name.into(),
            size_bytes: content.len() as u64,
            content_type: None,
            content,
        }
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_info_serializes_pascal_case() {
        let info = BlobInfo {
            name: "a.txt".to_string(),
            url: "https://x/c/a.txt".to_string(),
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"Name":"a.txt","Url":"https://x/c/a.txt"}"#);
    }

    #[test]
    fn test_candidate_size_from_content() {
        let candidate = UploadCandidate::new("notes.txt", &b"0123456789"[..]);
        assert_eq!(candidate.size_bytes, 10);
        assert!(candidate.content_type.is_none());

        let candidate = candidate.with_content_type("text/plain");
        assert_eq!(candidate.content_type.as_deref(), Some("text/plain"));
    }
}
