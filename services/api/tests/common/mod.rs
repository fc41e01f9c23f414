//! Shared helpers for the router integration tests.
#![allow(dead_code)]

use api_lib::{adapters::InMemoryDb, config::Config, web::build_router, web::state::AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bytegurukul_core::ports::DatabaseService;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "----bytegurukul-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    // Keeps the upload directory alive for the duration of the test.
    pub uploads: TempDir,
}

pub fn test_app() -> TestApp {
    test_app_with_db(Arc::new(InMemoryDb::new()))
}

pub fn test_app_with_db(db: Arc<dyn DatabaseService>) -> TestApp {
    let uploads = tempfile::tempdir().expect("tempdir");
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        db_max_connections: 1,
        log_level: tracing::Level::INFO,
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl_days: 30,
        upload_dir: uploads.path().to_path_buf(),
        cors_origin: "http://localhost:3000".to_string(),
    };
    let state = Arc::new(AppState::new(&config, db));
    TestApp {
        router: build_router(state.clone()),
        state,
        uploads,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Sends a raw body without a content type.
    pub async fn raw(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Registers an account and returns its token.
    pub async fn register(&self, username: &str, email: &str, role: Option<&str>) -> String {
        let mut body = serde_json::json!({
            "username": username,
            "email": email,
            "password": "s3cret-pass",
        });
        if let Some(role) = role {
            body["role"] = Value::from(role);
        }
        let (status, body) = self
            .json(Method::POST, "/api/auth/register", None, body)
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

/// A multipart part: (field name, optional (file name, content type), content).
pub type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, Vec<u8>);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}
