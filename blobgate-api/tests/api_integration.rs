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

//! API Integration Tests
//!
//! Tests the file management HTTP API using in-process requests.
//! No actual network I/O - uses tower::ServiceExt::oneshot directly.
//!
//! Tokens are minted with a shared HS256 secret and the service runs over
//! the in-memory blob backend.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use blobgate_api::{create_router, AppState, TokenValidator};
use blobgate_core::storage::BlobBackend;
use blobgate_core::{
    BackendError, BlobRepository, FileManagementService, MemoryBackend, UploadPolicy,
};
use bytes::Bytes;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use url::Url;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &[u8] = b"integration_test_secret_at_least_32_bytes";
const BOUNDARY: &str = "X-BLOBGATE-TEST-BOUNDARY";

/// Creates an AppState over `backend` with the given upload ceiling.
fn create_test_state(backend: Arc<dyn BlobBackend>, max_file_size: u64) -> AppState {
    let service =
        FileManagementService::new(BlobRepository::new(backend), UploadPolicy::new(max_file_size));
    AppState::new(service, TokenValidator::hs256(SECRET))
}

fn create_test_app() -> Router {
    create_router(create_test_state(Arc::new(MemoryBackend::new()), 100 * 1024 * 1024))
}

/// Mints a token for `oid` holding `scp`.
fn token_for(oid: &str, scp: &str) -> String {
    mint(json!({ "oid": oid, "scp": scp, "exp": (Utc::now() + Duration::hours(1)).timestamp() }))
}

fn mint(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Builds a multipart body with one file part.
fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/FileManager/upload")
        .header(header::AUTHORIZATION, bearer(token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap()
}

/// Helper to read response body as string.
async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}

// ============================================================================
// Authorization Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/FileManager/list")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(get_request("/api/FileManager/list", "not.a.jwt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = create_test_app();
    let token = mint(json!({
        "oid": "u",
        "scp": "Files.Manage",
        "exp": (Utc::now() - Duration::hours(1)).timestamp(),
    }));

    let response = app.oneshot(get_request("/api/FileManager/list", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_scope_rejected() {
    let app = create_test_app();

    let response = app
        .oneshot(get_request("/api/FileManager/list", &token_for("u", "User.Read")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers()[header::WWW_AUTHENTICATE].to_str().unwrap().to_string();
    assert!(challenge.contains("insufficient_scope"));
}

#[tokio::test]
async fn test_missing_subject_rejected() {
    let app = create_test_app();
    let token = mint(json!({
        "scp": "Files.Manage",
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
    }));

    let response = app.oneshot(get_request("/api/FileManager/list", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_custom_required_scope() {
    let state = create_test_state(Arc::new(MemoryBackend::new()), 1024)
        .with_required_scope("Blobs.ReadWrite");
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(get_request("/api/FileManager/list", &token_for("u", "Files.Manage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/FileManager/list", &token_for("u", "Blobs.ReadWrite")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_success() {
    let app = create_test_app();
    let token = token_for("TestUser", "Files.Manage");

    let response = app
        .oneshot(upload_request(&token, multipart_body("file", "notes.txt", b"0123456789")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["Message"], "File uploaded successfully.");

    let uri = body["BlobUri"].as_str().unwrap();
    assert!(uri.contains("/testuser-container/"));
    assert!(uri.ends_with(".txt"));
    assert!(Url::parse(uri).is_ok());
}

#[tokio::test]
async fn test_upload_empty_file() {
    let app = create_test_app();
    let token = token_for("TestUser", "Files.Manage");

    let response = app
        .oneshot(upload_request(&token, multipart_body("file", "empty.txt", b"")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({ "Error": "File is empty or null.", "FileName": "empty.txt" })
    );
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = create_test_app();
    let token = token_for("TestUser", "Files.Manage");

    let response = app
        .oneshot(upload_request(&token, multipart_body("attachment", "a.txt", b"abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({ "Error": "File is empty or null." })
    );
}

#[tokio::test]
async fn test_upload_disallowed_extension() {
    let app = create_test_app();
    let token = token_for("TestUser", "Files.Manage");

    let response = app
        .oneshot(upload_request(&token, multipart_body("file", "setup.exe", b"MZ")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["FileName"], "setup.exe");
    assert!(body["Error"].as_str().unwrap().contains(".exe"));
}

#[tokio::test]
async fn test_upload_over_file_ceiling() {
    let state = create_test_state(Arc::new(MemoryBackend::new()), 16).with_max_request_size(4096);
    let app = create_router(state);
    let token = token_for("TestUser", "Files.Manage");

    let response = app
        .oneshot(upload_request(&token, multipart_body("file", "big.csv", &[b'a'; 64])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["FileName"], "big.csv");
    assert_eq!(
        body["Error"],
        "File size 64 bytes exceeds the maximum allowed size of 16 bytes."
    );
}

#[tokio::test]
async fn test_upload_over_request_limit() {
    let state = create_test_state(Arc::new(MemoryBackend::new()), 16).with_max_request_size(1024);
    let app = create_router(state);
    let token = token_for("TestUser", "Files.Manage");

    let response = app
        .oneshot(upload_request(&token, multipart_body("file", "huge.csv", &[b'a'; 8192])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// List / Download Tests
// ============================================================================

#[tokio::test]
async fn test_list_empty() {
    let app = create_test_app();

    let response = app
        .oneshot(get_request("/api/FileManager/list", &token_for("NewUser", "Files.Manage")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_string(response.into_body()).await, "[]");
}

#[tokio::test]
async fn test_upload_list_download_round_trip() {
    let app = create_test_app();
    let token = token_for("ListUser", "Files.Manage");
    let content = b"{\"hello\":\"world\"}";

    let response = app
        .clone()
        .oneshot(upload_request(&token, multipart_body("file", "data.json", content)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let blob_uri = body_to_json(response.into_body()).await["BlobUri"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(get_request("/api/FileManager/list", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_to_json(response.into_body()).await;
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["Url"], blob_uri.as_str());
    let name = entries[0]["Name"].as_str().unwrap().to_string();
    assert!(name.ends_with(".json"));

    let response = app
        .oneshot(get_request(
            &format!("/api/FileManager/download?blobName={name}"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
        format!("attachment; filename={name}")
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], &content[..]);
}

#[tokio::test]
async fn test_download_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(get_request(
            "/api/FileManager/download?blobName=missing.txt",
            &token_for("Owner", "Files.Manage"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({
            "Error": "Blob 'missing.txt' not found in container 'owner-container'.",
            "BlobName": "missing.txt",
            "ContainerName": "owner-container",
        })
    );
}

#[tokio::test]
async fn test_download_blank_name() {
    let app = create_test_app();
    let token = token_for("Owner", "Files.Manage");

    for uri in ["/api/FileManager/download", "/api/FileManager/download?blobName="] {
        let response = app.clone().oneshot(get_request(uri, &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, json!({ "Error": "Blob name cannot be null or empty." }));
    }
}

// ============================================================================
// Backend Failure Tests
// ============================================================================

/// Backend whose every I/O call fails.
struct UnavailableBackend;

fn unavailable() -> BackendError {
    BackendError::Status {
        status: 503,
        code: Some("ServerBusy".to_string()),
        message: "The server is busy.".to_string(),
    }
}

#[async_trait]
impl BlobBackend for UnavailableBackend {
    async fn create_container_if_not_exists(&self, _: &str) -> Result<(), BackendError> {
        Err(unavailable())
    }

    async fn container_exists(&self, _: &str) -> Result<bool, BackendError> {
        Err(unavailable())
    }

    async fn upload_blob(&self, _: &str, _: &str, _: &str, _: Bytes) -> Result<(), BackendError> {
        Err(unavailable())
    }

    async fn list_blobs(&self, _: &str) -> Result<Vec<String>, BackendError> {
        Err(unavailable())
    }

    async fn blob_exists(&self, _: &str, _: &str) -> Result<bool, BackendError> {
        Err(unavailable())
    }

    async fn download_blob(&self, _: &str, _: &str) -> Result<Bytes, BackendError> {
        Err(unavailable())
    }

    fn blob_url(&self, container: &str, blob_name: &str) -> Result<Url, BackendError> {
        Url::parse(&format!("https://busy.invalid/{container}/{blob_name}"))
            .map_err(|e| BackendError::Configuration(e.to_string()))
    }
}

#[tokio::test]
async fn test_storage_failure_returns_500_with_details() {
    let app = create_router(create_test_state(Arc::new(UnavailableBackend), 1024));
    let token = token_for("Busy", "Files.Manage");

    let response = app
        .clone()
        .oneshot(get_request("/api/FileManager/list", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({
            "Error": "An error occurred while accessing blob storage.",
            "Details": "Failed to list blobs in container 'busy-container'.",
        })
    );

    let response = app
        .oneshot(upload_request(&token, multipart_body("file", "a.txt", b"abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["Error"], "An error occurred while accessing blob storage.");
    assert!(!body.to_string().contains("ServerBusy"));
}

// ============================================================================
// Routing Tests
// ============================================================================

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(get_request("/api/FileManager/delete", &token_for("u", "Files.Manage")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
