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

//! Application initialization and runtime.
//!
//! This module handles:
//! - Blob backend and token validator construction
//! - HTTP server setup and routing
//! - TLS/HTTPS configuration
//! - Graceful shutdown

use crate::config::{AuthConfig, BackendKind, Config, StorageConfig};
use anyhow::{bail, Context, Result};
use axum::ServiceExt;
use blobgate_api::{create_router, AppState, TokenValidator};
use blobgate_core::storage::{AzureBlobBackend, BlobBackend, MemoryBackend};
use blobgate_core::{BlobRepository, FileManagementService, UploadPolicy};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::normalize_path::NormalizePath;
use tracing::{info, warn};

/// Main application.
pub struct App {
    config: Config,
    /// Blob backend shared by every request.
    backend: Arc<dyn BlobBackend>,
    token_validator: TokenValidator,
}

impl App {
    /// Creates a new application instance.
    ///
    /// Builds the blob backend and the token validator. Performs no network
    /// I/O; an unreachable storage account surfaces on first request.
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing Blobgate application...");

        let backend = build_backend(&config.storage)?;
        let token_validator = build_token_validator(&config.auth).await?;

        info!("Blob backend initialized ({:?})", config.storage.backend);

        Ok(Self {
            config,
            backend,
            token_validator,
        })
    }

    /// Builds the application state without installing a metrics recorder.
    pub fn state(&self) -> AppState {
        let repository = BlobRepository::new(self.backend.clone());
        let policy = UploadPolicy::new(self.config.upload.max_file_size);
        AppState::new(
            FileManagementService::new(repository, policy),
            self.token_validator.clone(),
        )
        .with_required_scope(self.config.auth.required_scope.clone())
        .with_max_request_size(self.config.server.max_request_size)
    }

    /// Runs the application (HTTP/HTTPS server).
    ///
    /// If TLS is configured via `BLOBGATE_TLS_CERT` and `BLOBGATE_TLS_KEY`
    /// environment variables, the server will use HTTPS. Otherwise, it runs
    /// as HTTP.
    pub async fn run(self) -> Result<()> {
        self.config
            .server
            .tls
            .validate()
            .map_err(|e| anyhow::anyhow!("TLS configuration error: {}", e))?;

        info!("Blobgate Server starting...");
        info!(
            "Max file size: {} bytes ({:.2} MB), max request size: {} bytes",
            self.config.upload.max_file_size,
            self.config.upload.max_file_size as f64 / (1024.0 * 1024.0),
            self.config.server.max_request_size
        );
        info!("Required scope: {}", self.config.auth.required_scope);

        let addr: SocketAddr = self
            .config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.config.server.bind))?;

        let tls_config = if self.config.server.tls.enabled {
            Some(self.load_tls_config().await?)
        } else {
            None
        };

        let prometheus_handle = if self.config.metrics.prometheus_enabled {
            use metrics_exporter_prometheus::PrometheusBuilder;
            match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => {
                    info!("Prometheus metrics enabled (available at /metrics)");
                    Some(handle)
                }
                Err(e) => {
                    warn!("Failed to install Prometheus recorder: {}. Metrics disabled.", e);
                    None
                }
            }
        } else {
            info!("Prometheus metrics disabled");
            None
        };

        let mut state = self.state();
        if let Some(handle) = prometheus_handle {
            state = state.with_prometheus_handle(handle);
        }

        let router = create_router(state);

        if let Some(rustls_config) = tls_config {
            info!("Listening on https://{}", addr);
            run_https_server(addr, router, rustls_config).await
        } else {
            info!("Listening on http://{}", addr);
            run_http_server(addr, router).await
        }
    }

    /// Loads TLS configuration from certificate and key files.
    async fn load_tls_config(&self) -> Result<axum_server::tls_rustls::RustlsConfig> {
        use axum_server::tls_rustls::RustlsConfig;

        let tls_config = &self.config.server.tls;

        let cert_path =
            tls_config.cert_path.as_ref().context("TLS certificate path not configured")?;
        let key_path =
            tls_config.key_path.as_ref().context("TLS private key path not configured")?;

        info!("Loading TLS certificate from {:?}", cert_path);
        info!("Loading TLS private key from {:?}", key_path);

        let rustls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .context("Failed to load TLS certificate and key")?;

        info!("TLS configured successfully");
        Ok(rustls_config)
    }
}

/// Builds the configured blob backend.
pub fn build_backend(config: &StorageConfig) -> Result<Arc<dyn BlobBackend>> {
    match config.backend {
        BackendKind::Memory => {
            warn!("Using in-memory blob backend; files are lost on exit");
            let backend = MemoryBackend::with_base_url(&config.memory_base_url)
                .context("Invalid BLOBGATE_MEMORY_BASE_URL")?;
            Ok(Arc::new(backend))
        }
        BackendKind::Azure => {
            let backend = if let Some(connection_string) = &config.connection_string {
                info!("Using storage account from connection string");
                AzureBlobBackend::from_connection_string(connection_string)
                    .context("Invalid storage connection string")?
            } else if let (Some(uri), Some(key)) = (&config.account_uri, &config.account_key) {
                info!("Using storage account at {}", uri);
                AzureBlobBackend::from_account_uri(uri, config.account_name.as_deref(), key)
                    .context("Invalid storage account settings")?
            } else {
                bail!(
                    "Azure backend requires a connection string or an account URI with an account key"
                );
            };
            Ok(Arc::new(backend))
        }
    }
}

/// Builds the bearer token validator.
///
/// An RS256 public key takes precedence over an HS256 secret.
pub async fn build_token_validator(config: &AuthConfig) -> Result<TokenValidator> {
    let validator = if let Some(path) = &config.public_key_path {
        let pem = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read token public key {:?}", path))?;
        info!("Validating RS256 tokens with key {:?}", path);
        TokenValidator::rs256_pem(&pem).context("Invalid token public key")?
    } else if let Some(secret) = &config.secret {
        info!("Validating HS256 tokens with shared secret");
        TokenValidator::hs256(secret.as_bytes())
    } else {
        bail!("No token key configured: set BLOBGATE_AUTH_SECRET or BLOBGATE_AUTH_PUBLIC_KEY");
    };

    let audiences = config.audiences();
    if audiences.is_empty() {
        warn!("No token audience configured; audience is not checked");
    }
    let mut validator = validator.with_audiences(&audiences);
    if let Some(issuer) = config.issuer() {
        info!("Expected token issuer: {}", issuer);
        validator = validator.with_issuer(&issuer);
    }
    Ok(validator)
}

/// Runs the HTTP server (without TLS).
async fn run_http_server(addr: SocketAddr, router: axum::Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;

    // Trim trailing slashes so `/api/FileManager/list/` routes like `/api/FileManager/list`
    let app = NormalizePath::trim_trailing_slash(router);

    axum::serve(
        listener,
        ServiceExt::<axum::http::Request<axum::body::Body>>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Runs the HTTPS server (with TLS).
async fn run_https_server(
    addr: SocketAddr,
    router: axum::Router,
    rustls_config: axum_server::tls_rustls::RustlsConfig,
) -> Result<()> {
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
    });

    let app = NormalizePath::trim_trailing_slash(router);

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(ServiceExt::<axum::http::Request<axum::body::Body>>::into_make_service(app))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handles graceful shutdown signals.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown...");
        }
    }
}
