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

//! Configuration management for the Blobgate server.
//!
//! Every setting has a default and can be overridden by a `BLOBGATE_*`
//! environment variable.

use blobgate_core::storage::DEFAULT_MEMORY_BASE_URL;
use blobgate_core::{DEFAULT_MAX_FILE_SIZE, FILES_MANAGE_SCOPE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings (bind address, TLS, body limit)
    pub server: ServerConfig,
    /// Blob storage backend selection and credentials
    pub storage: StorageConfig,
    /// Upload policy settings
    pub upload: UploadConfig,
    /// Bearer token validation settings
    pub auth: AuthConfig,
    /// Metrics and monitoring configuration
    pub metrics: MetricsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    pub bind: String,
    /// Maximum request body size in bytes.
    /// Can be set via BLOBGATE_MAX_REQUEST_SIZE (e.g., "200MB").
    pub max_request_size: usize,
    /// TLS configuration for HTTPS support.
    pub tls: TlsConfig,
}

/// TLS/HTTPS configuration.
///
/// TLS is disabled by default. To enable TLS, set the `BLOBGATE_TLS_CERT` and
/// `BLOBGATE_TLS_KEY` environment variables to point to PEM-encoded
/// certificate and private key files.
///
/// Example:
/// ```bash
/// export BLOBGATE_TLS_CERT=/path/to/cert.pem
/// export BLOBGATE_TLS_KEY=/path/to/key.pem
/// ./blobgate-server
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether TLS is enabled.
    /// Automatically set to true when both cert_path and key_path are provided.
    pub enabled: bool,
    /// Path to PEM-encoded certificate file.
    pub cert_path: Option<PathBuf>,
    /// Path to PEM-encoded private key file.
    pub key_path: Option<PathBuf>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        let cert_path = env_var("BLOBGATE_TLS_CERT").map(PathBuf::from);
        let key_path = env_var("BLOBGATE_TLS_KEY").map(PathBuf::from);

        // Enable TLS only if both cert and key are provided
        let enabled = cert_path.is_some() && key_path.is_some();

        Self {
            enabled,
            cert_path,
            key_path,
        }
    }
}

impl TlsConfig {
    /// Validates TLS configuration.
    ///
    /// Returns an error if TLS is enabled but certificate or key paths are missing.
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled {
            if self.cert_path.is_none() {
                return Err("TLS enabled but BLOBGATE_TLS_CERT is not set".to_string());
            }
            if self.key_path.is_none() {
                return Err("TLS enabled but BLOBGATE_TLS_KEY is not set".to_string());
            }
        }
        Ok(())
    }
}

/// Which blob backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Azure Blob Storage (or a compatible emulator).
    Azure,
    /// In-process store; contents are lost on exit.
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azure" => Ok(BackendKind::Azure),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("Unknown storage backend: {other}")),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    pub backend: BackendKind,
    /// Connection string (takes precedence over account URI + key).
    pub connection_string: Option<String>,
    /// Blob endpoint URI.
    pub account_uri: Option<String>,
    /// Account name; derived from the URI when unset.
    pub account_name: Option<String>,
    /// Base64 account key.
    pub account_key: Option<String>,
    /// URL prefix for blobs held by the in-memory backend.
    pub memory_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: env_var("BLOBGATE_STORAGE_BACKEND")
                .and_then(|s| s.parse().ok())
                .unwrap_or(BackendKind::Azure),
            connection_string: env_var("BLOBGATE_STORAGE_CONNECTION_STRING"),
            account_uri: env_var("BLOBGATE_STORAGE_ACCOUNT_URI"),
            account_name: env_var("BLOBGATE_STORAGE_ACCOUNT_NAME"),
            account_key: env_var("BLOBGATE_STORAGE_ACCOUNT_KEY"),
            memory_base_url: env_var("BLOBGATE_MEMORY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MEMORY_BASE_URL.to_string()),
        }
    }
}

impl StorageConfig {
    /// Checks that the selected backend has what it needs to connect.
    pub fn validate(&self) -> Result<(), String> {
        if self.backend == BackendKind::Azure
            && self.connection_string.is_none()
            && (self.account_uri.is_none() || self.account_key.is_none())
        {
            return Err("Azure backend requires BLOBGATE_STORAGE_CONNECTION_STRING or \
                 BLOBGATE_STORAGE_ACCOUNT_URI with BLOBGATE_STORAGE_ACCOUNT_KEY"
                .to_string());
        }
        Ok(())
    }
}

/// Upload policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted file size in bytes.
    /// Can be set via BLOBGATE_MAX_FILE_SIZE (e.g., "100MB").
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: env_var("BLOBGATE_MAX_FILE_SIZE")
                .and_then(|s| parse_size(&s).ok())
                .map(|size| size as u64)
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

/// Bearer token validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 shared secret.
    pub secret: Option<String>,
    /// Path to an RS256 PEM public key (takes precedence over the secret).
    pub public_key_path: Option<PathBuf>,
    /// Authority instance, e.g. `https://login.microsoftonline.com/`.
    pub instance: Option<String>,
    /// Tenant identifier appended to the instance.
    pub tenant_id: Option<String>,
    /// Explicit issuer; overrides instance + tenant.
    pub issuer: Option<String>,
    /// Application (client) identifier.
    pub client_id: Option<String>,
    /// Additional accepted audience.
    pub audience: Option<String>,
    /// Scope every file route requires.
    pub required_scope: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: env_var("BLOBGATE_AUTH_SECRET"),
            public_key_path: env_var("BLOBGATE_AUTH_PUBLIC_KEY").map(PathBuf::from),
            instance: env_var("BLOBGATE_AUTH_INSTANCE"),
            tenant_id: env_var("BLOBGATE_AUTH_TENANT_ID"),
            issuer: env_var("BLOBGATE_AUTH_ISSUER"),
            client_id: env_var("BLOBGATE_AUTH_CLIENT_ID"),
            audience: env_var("BLOBGATE_AUTH_AUDIENCE"),
            required_scope: env_var("BLOBGATE_AUTH_REQUIRED_SCOPE")
                .unwrap_or_else(|| FILES_MANAGE_SCOPE.to_string()),
        }
    }
}

impl AuthConfig {
    /// Expected token issuer, if any.
    ///
    /// An explicit issuer wins; otherwise `{instance}{tenant_id}/v2.0` when
    /// both parts are set.
    pub fn issuer(&self) -> Option<String> {
        if let Some(issuer) = &self.issuer {
            return Some(issuer.clone());
        }
        match (&self.instance, &self.tenant_id) {
            (Some(instance), Some(tenant)) => {
                Some(format!("{}/{}/v2.0", instance.trim_end_matches('/'), tenant))
            }
            _ => None,
        }
    }

    /// Accepted audiences. The client id is accepted both bare and as
    /// `api://{client_id}`.
    pub fn audiences(&self) -> Vec<String> {
        let mut audiences = Vec::new();
        if let Some(client_id) = &self.client_id {
            audiences.push(client_id.clone());
            audiences.push(format!("api://{client_id}"));
        }
        if let Some(audience) = &self.audience {
            if !audiences.contains(audience) {
                audiences.push(audience.clone());
            }
        }
        audiences
    }

    /// Checks that a verification key is configured.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_none() && self.public_key_path.is_none() {
            return Err(
                "No token key configured: set BLOBGATE_AUTH_SECRET or BLOBGATE_AUTH_PUBLIC_KEY"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics
    pub prometheus_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prometheus_enabled: env_var("BLOBGATE_METRICS_ENABLED")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(true),
        }
    }
}

impl Config {
    /// Loads configuration from the environment and validates it.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::default();
        config.validate().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), String> {
        self.server.tls.validate()?;
        self.storage.validate()?;
        self.auth.validate()?;
        if (self.server.max_request_size as u64) < self.upload.max_file_size {
            tracing::warn!(
                "Request limit ({} bytes) is below the file ceiling ({} bytes); \
                 large uploads will be refused with 413",
                self.server.max_request_size,
                self.upload.max_file_size
            );
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let upload = UploadConfig::default();
        let default_request_size = upload.max_file_size.saturating_mul(2) as usize;

        Self {
            server: ServerConfig {
                bind: env_var("BLOBGATE_BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
                max_request_size: env_var("BLOBGATE_MAX_REQUEST_SIZE")
                    .and_then(|s| parse_size(&s).ok())
                    .unwrap_or(default_request_size),
                tls: TlsConfig::default(),
            },
            storage: StorageConfig::default(),
            upload,
            auth: AuthConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Reads a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a size string like "10GB", "100MB", "1024KB", "5000" into bytes.
///
/// Supported suffixes (case-insensitive):
/// - GB, G: Gigabytes
/// - MB, M: Megabytes
/// - KB, K: Kilobytes
/// - B or no suffix: Bytes
pub fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim().to_uppercase();

    if s.is_empty() {
        return Err("Empty size string".to_string());
    }

    let num_end = s.chars().position(|c| !c.is_ascii_digit() && c != '.').unwrap_or(s.len());

    let (num_str, suffix) = s.split_at(num_end);
    let suffix = suffix.trim();

    let num: f64 = num_str.parse().map_err(|_| format!("Invalid number: {}", num_str))?;

    let multiplier: usize = match suffix {
        "GB" | "G" => 1024 * 1024 * 1024,
        "MB" | "M" => 1024 * 1024,
        "KB" | "K" => 1024,
        "B" | "" => 1,
        _ => return Err(format!("Unknown size suffix: {}", suffix)),
    };

    Ok((num * multiplier as f64) as usize)
}
