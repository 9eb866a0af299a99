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

//! Axum HTTP server setup and routing.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use blobgate_core::{FileManagementService, DEFAULT_MAX_FILE_SIZE, FILES_MANAGE_SCOPE};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::auth::TokenValidator;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{auth_middleware, metrics_middleware};

/// Default HTTP body limit: twice the default upload ceiling, leaving room
/// for the policy gate to report oversize files itself.
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 2 * DEFAULT_MAX_FILE_SIZE as usize;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// File management service.
    pub service: Arc<FileManagementService>,
    /// Bearer token validator.
    pub token_validator: Arc<TokenValidator>,
    /// Scope every file route requires.
    pub required_scope: String,
    /// Maximum request body size in bytes.
    pub max_request_size: usize,
    /// Prometheus metrics handle for rendering `/metrics` endpoint.
    pub prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
}

impl AppState {
    /// Creates a new application state requiring `Files.Manage`.
    pub fn new(service: FileManagementService, token_validator: TokenValidator) -> Self {
        Self {
            service: Arc::new(service),
            token_validator: Arc::new(token_validator),
            required_scope: FILES_MANAGE_SCOPE.to_string(),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            prometheus_handle: None,
        }
    }

    /// Sets the scope every file route requires.
    pub fn with_required_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scope = scope.into();
        self
    }

    /// Sets the HTTP body limit.
    pub fn with_max_request_size(mut self, max_request_size: usize) -> Self {
        self.max_request_size = max_request_size;
        self
    }

    /// Sets the Prometheus handle for rendering metrics.
    pub fn with_prometheus_handle(
        mut self,
        handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        self.prometheus_handle = Some(handle);
        self
    }
}

/// Converts a handler panic into the generic 500 body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Creates the router.
///
/// - `/api/FileManager/{upload,list,download}` behind bearer authorization
/// - `/metrics` unauthenticated
pub fn create_router(state: AppState) -> Router {
    let file_router = Router::new()
        .route("/upload", post(handlers::upload_file))
        .route("/list", get(handlers::list_files))
        .route("/download", get(handlers::download_file))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/FileManager", file_router)
        // Observability endpoint (no auth required)
        .route("/metrics", get(handlers::stats::prometheus_metrics))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(state.max_request_size))
        .with_state(state)
}
