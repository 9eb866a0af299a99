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

//! Blobgate Core - file management over blob storage
//!
//! This crate provides the domain layer of the Blobgate gateway:
//! - Principal and per-subject container resolution
//! - Upload policy gate (presence, size ceiling, extension allow-list)
//! - Blob backends (in-memory and Azure Blob Storage) behind one trait
//! - The container-scoped repository and the file management service

pub mod error;
pub mod identity;
pub mod policy;
pub mod service;
pub mod storage;
pub mod types;

pub use error::{BackendError, FileServiceError, StorageError, UploadRejection};
pub use identity::{resolve_container, Principal, FILES_MANAGE_SCOPE};
pub use policy::{UploadPolicy, DEFAULT_MAX_FILE_SIZE, PERMITTED_EXTENSIONS};
pub use service::FileManagementService;
pub use storage::{BlobBackend, BlobRepository, MemoryBackend};
pub use types::{BlobInfo, ContainerName, UploadCandidate};
