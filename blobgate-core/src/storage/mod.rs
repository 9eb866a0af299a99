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

//! Blob storage: backend capability trait, backends and the repository.

pub mod azure;
pub mod backend;
pub mod memory;
pub mod repository;

pub use azure::AzureBlobBackend;
pub use backend::BlobBackend;
pub use memory::{MemoryBackend, DEFAULT_MEMORY_BASE_URL};
pub use repository::BlobRepository;
