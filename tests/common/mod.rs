//! Shared helpers for the HTTP API tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use drive_core::config::AppConfig;
use drive_core::config::database::DatabaseBackend;
use drive_core::config::storage::StorageProviderKind;

pub const OWNER: &str = "user-1";
pub const OTHER_OWNER: &str = "user-2";
const BOUNDARY: &str = "drive-test-boundary";

/// In-memory application for making test requests.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(memory_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let state = drive_api::build_state(config)
            .await
            .expect("memory backends always open");
        Self::from_state(state)
    }

    pub fn from_state(state: drive_api::AppState) -> Self {
        Self {
            router: drive_api::build_app(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send and decode a JSON response.
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, owner: &str, uri: &str) -> (StatusCode, Value) {
        self.call(request("GET", uri, owner).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, owner: &str, uri: &str) -> (StatusCode, Value) {
        self.call(request("DELETE", uri, owner).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_empty(&self, owner: &str, uri: &str) -> (StatusCode, Value) {
        self.call(request("POST", uri, owner).body(Body::empty()).unwrap())
            .await
    }

    pub async fn send_json(
        &self,
        method: &str,
        owner: &str,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        self.call(
            request(method, uri, owner)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Create a folder and return its id.
    pub async fn create_folder(&self, owner: &str, name: &str, parent_id: Option<&str>) -> String {
        let (status, body) = self
            .send_json(
                "POST",
                owner,
                "/api/folders",
                serde_json::json!({ "name": name, "parentId": parent_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Upload one file through the multipart endpoint.
    pub async fn upload(
        &self,
        owner: &str,
        parent_id: Option<&str>,
        part: FilePart<'_>,
    ) -> (StatusCode, Value) {
        let body = multipart_body(parent_id, "file", &[part]);
        self.call(multipart_request("/api/files/upload", owner, body))
            .await
    }

    /// Store content only, through the blob endpoint.
    pub async fn upload_blob(&self, owner: &str, part: FilePart<'_>) -> (StatusCode, Value) {
        let body = multipart_body(None, "file", &[part]);
        self.call(multipart_request("/api/files/blob", owner, body))
            .await
    }

    pub async fn upload_many(
        &self,
        owner: &str,
        parent_id: Option<&str>,
        parts: &[FilePart<'_>],
    ) -> (StatusCode, Value) {
        let body = multipart_body(parent_id, "files", parts);
        self.call(multipart_request("/api/files/upload-many", owner, body))
            .await
    }
}

/// One file part of a multipart form.
#[derive(Debug, Clone, Copy)]
pub struct FilePart<'a> {
    pub name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

pub fn part<'a>(name: &'a str, content_type: &'a str, data: &'a [u8]) -> FilePart<'a> {
    FilePart {
        name,
        content_type,
        data,
    }
}

pub fn memory_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = DatabaseBackend::Memory;
    config.storage.provider = StorageProviderKind::Memory;
    config.server.public_base_url = "http://drive.test".to_string();
    config
}

pub fn request(method: &str, uri: &str, owner: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-owner-id", owner)
}

fn multipart_request(uri: &str, owner: &str, body: Vec<u8>) -> Request<Body> {
    request("POST", uri, owner)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn multipart_body(parent_id: Option<&str>, field: &str, parts: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(parent_id) = parent_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"parentId\"\r\n\r\n{parent_id}\r\n"
            )
            .as_bytes(),
        );
    }
    for part in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                part.name, part.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
