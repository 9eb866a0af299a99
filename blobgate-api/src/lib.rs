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

//! Blobgate API Layer - HTTP boundary
//!
//! This crate provides the HTTP API layer for Blobgate, including:
//! - Bearer token validation and scope checks
//! - Upload, list and download handlers
//! - JSON error mapping
//! - Middleware for auth and metrics

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use auth::{AuthError, TokenValidator};
pub use error::ApiError;
pub use server::{create_router, AppState, DEFAULT_MAX_REQUEST_SIZE};
