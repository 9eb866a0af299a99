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

//! Blobgate Server - gateway binary support.
//!
//! Configuration loading and application runtime, split out of `main` so
//! they can be exercised by integration tests.

pub mod app;
pub mod config;

pub use app::{build_backend, build_token_validator, App};
pub use config::{parse_size, Config};
