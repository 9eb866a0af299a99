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

//! Azure Blob Storage backend.
//!
//! Request signing, retries and List Blobs paging are handled by the Azure
//! storage SDK; this module only resolves where the account lives and maps
//! SDK failures into [`BackendError`].

use async_trait::async_trait;
use azure_core::error::{Error as AzureError, ErrorKind};
use azure_storage::{CloudLocation, ConnectionString, StorageCredentials};
use azure_storage_blobs::prelude::{BlobServiceClient, ClientBuilder};
use bytes::Bytes;
use futures::StreamExt;
use std::net::IpAddr;
use tracing::debug;
use url::Url;

use crate::error::BackendError;
use crate::storage::backend::BlobBackend;

/// Account name of the local storage emulator.
pub const EMULATOR_ACCOUNT_NAME: &str = "devstoreaccount1";

/// Well-known, publicly documented key of the local storage emulator.
pub const EMULATOR_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// Host of the local storage emulator.
pub const EMULATOR_HOST: &str = "127.0.0.1";

/// Blob service port of the local storage emulator.
pub const EMULATOR_BLOB_PORT: u16 = 10000;

const CONTAINER_ALREADY_EXISTS: &str = "ContainerAlreadyExists";

/// Blob backend for a storage account.
///
/// Wraps a `BlobServiceClient`, which pools connections and is cheap to clone.
#[derive(Clone)]
pub struct AzureBlobBackend {
    service: BlobServiceClient,
}

impl AzureBlobBackend {
    /// Creates a backend for an account at `location`.
    pub fn new(location: CloudLocation, credentials: StorageCredentials) -> Self {
        let service = ClientBuilder::with_location(location, credentials).blob_service_client();
        Self { service }
    }

    /// Backend for a storage emulator listening on `host:port`.
    pub fn emulator(host: &str, port: u16) -> Self {
        Self::new(
            CloudLocation::Emulator {
                address: host.to_string(),
                port,
            },
            StorageCredentials::access_key(EMULATOR_ACCOUNT_NAME, EMULATOR_ACCOUNT_KEY.to_string()),
        )
    }

    /// Builds a backend from a storage connection string.
    ///
    /// `UseDevelopmentStorage=true` selects the local emulator. Otherwise the
    /// string must carry either an account key or a shared access signature,
    /// and an `AccountName` or `BlobEndpoint`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Configuration` when the string cannot be parsed
    /// or does not identify an account and a credential.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, BackendError> {
        let parsed = ConnectionString::new(connection_string).map_err(configuration)?;
        if parsed.use_development_storage == Some(true) {
            return Ok(Self::emulator(EMULATOR_HOST, EMULATOR_BLOB_PORT));
        }

        let credentials = parsed.storage_credentials().map_err(configuration)?;
        let location = match (parsed.blob_endpoint, parsed.account_name) {
            (Some(endpoint), account) => {
                let account = match account {
                    Some(account) => account.to_string(),
                    None => account_name_from_endpoint(&parse_url(endpoint)?).unwrap_or_default(),
                };
                CloudLocation::Custom {
                    account,
                    uri: endpoint.to_string(),
                }
            }
            (None, Some(account)) => match parsed.endpoint_suffix {
                Some(suffix) => CloudLocation::Custom {
                    account: account.to_string(),
                    uri: format!("https://{account}.blob.{suffix}"),
                },
                None => CloudLocation::Public {
                    account: account.to_string(),
                },
            },
            (None, None) => {
                return Err(BackendError::Configuration(
                    "connection string has neither AccountName nor BlobEndpoint".to_string(),
                ))
            }
        };

        Ok(Self::new(location, credentials))
    }

    /// Builds a backend from a blob endpoint URI and account key.
    ///
    /// When `account_name` is not given it is taken from the first label of a
    /// DNS host (`acct.blob.core.windows.net`), or from the first path segment
    /// of an IP/localhost endpoint (`http://127.0.0.1:10000/devstoreaccount1`).
    pub fn from_account_uri(
        account_uri: &str,
        account_name: Option<&str>,
        account_key: &str,
    ) -> Result<Self, BackendError> {
        let endpoint = parse_url(account_uri)?;
        let account = match account_name {
            Some(name) => name.to_string(),
            None => account_name_from_endpoint(&endpoint).ok_or_else(|| {
                BackendError::Configuration(format!(
                    "cannot derive account name from '{account_uri}'"
                ))
            })?,
        };

        let credentials = StorageCredentials::access_key(account.clone(), account_key.trim().to_string());
        Ok(Self::new(
            CloudLocation::Custom {
                account,
                uri: account_uri.trim_end_matches('/').to_string(),
            },
            credentials,
        ))
    }
}

fn configuration(err: AzureError) -> BackendError {
    BackendError::Configuration(err.to_string())
}

/// Maps an SDK failure, keeping the HTTP status and service error code.
fn backend_error(err: AzureError) -> BackendError {
    match err.kind() {
        ErrorKind::HttpResponse { status, error_code } => BackendError::Status {
            status: u16::from(*status),
            code: error_code.clone(),
            message: err.to_string(),
        },
        ErrorKind::DataConversion => BackendError::InvalidResponse(err.to_string()),
        ErrorKind::Credential => BackendError::Configuration(err.to_string()),
        _ => BackendError::Transport(err.to_string()),
    }
}

fn parse_url(value: &str) -> Result<Url, BackendError> {
    Url::parse(value).map_err(|e| BackendError::Configuration(format!("invalid URL '{value}': {e}")))
}

fn account_name_from_endpoint(endpoint: &Url) -> Option<String> {
    let host = endpoint.host_str()?;
    let is_ip = host.trim_matches(['[', ']']).parse::<IpAddr>().is_ok();
    if !is_ip && host.contains('.') {
        return host.split('.').next().map(str::to_string);
    }
    endpoint
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl BlobBackend for AzureBlobBackend {
    async fn create_container_if_not_exists(&self, container: &str) -> Result<(), BackendError> {
        match self.service.container_client(container).create().await {
            Ok(_) => {
                debug!("Container created: {}", container);
                Ok(())
            }
            Err(err) => match backend_error(err) {
                BackendError::Status {
                    status: 409,
                    code: Some(code),
                    ..
                } if code == CONTAINER_ALREADY_EXISTS => Ok(()),
                err => Err(err),
            },
        }
    }

    async fn container_exists(&self, container: &str) -> Result<bool, BackendError> {
        self.service
            .container_client(container)
            .exists()
            .await
            .map_err(backend_error)
    }

    async fn upload_blob(
        &self,
        container: &str,
        blob_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), BackendError> {
        self.service
            .container_client(container)
            .blob_client(blob_name)
            .put_block_blob(data)
            .content_type(content_type.to_string())
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, BackendError> {
        let mut pages = self
            .service
            .container_client(container)
            .list_blobs()
            .into_stream();

        let mut names = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(backend_error)?;
            names.extend(page.blobs.blobs().map(|blob| blob.name.clone()));
        }
        Ok(names)
    }

    async fn blob_exists(&self, container: &str, blob_name: &str) -> Result<bool, BackendError> {
        self.service
            .container_client(container)
            .blob_client(blob_name)
            .exists()
            .await
            .map_err(backend_error)
    }

    async fn download_blob(&self, container: &str, blob_name: &str) -> Result<Bytes, BackendError> {
        self.service
            .container_client(container)
            .blob_client(blob_name)
            .get_content()
            .await
            .map(Bytes::from)
            .map_err(backend_error)
    }

    fn blob_url(&self, container: &str, blob_name: &str) -> Result<Url, BackendError> {
        self.service
            .container_client(container)
            .blob_client(blob_name)
            .url()
            .map_err(backend_error)
    }
}
