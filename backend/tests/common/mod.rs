//! Shared helpers for driving the router in integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::{Task, TASKS_PATH};
use taskflow_backend::{api_router, AppState, BackingStore, MemoryStore, StoreError};
use tower::ServiceExt;

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}

pub fn memory_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (api_router(AppState::new(store.clone())), store)
}

pub fn app_with(store: Arc<dyn BackingStore>) -> Router {
    api_router(AppState::new(store))
}

pub async fn send(app: &Router, method: Method, body: impl Into<Body>) -> Reply {
    send_to(app, method, TASKS_PATH, body).await
}

pub async fn send_to(app: &Router, method: Method, uri: &str, body: impl Into<Body>) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    Reply {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router) -> Reply {
    send(app, Method::GET, Body::empty()).await
}

pub async fn post(app: &Router, body: &str) -> Reply {
    send(app, Method::POST, body.to_string()).await
}

pub fn assert_cors(reply: &Reply) {
    assert_eq!(reply.headers["access-control-allow-origin"], "*");
    assert_eq!(reply.headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(reply.headers["access-control-allow-headers"], "Content-Type");
}

/// Store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl BackingStore for FailingStore {
    async fn load(&self) -> Vec<Task> {
        Vec::new()
    }

    async fn store(&self, _tasks: &[Task]) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        )))
    }

    fn describe(&self) -> &'static str {
        "failing"
    }
}

/// Store that panics on every read.
pub struct PanickingStore;

#[async_trait]
impl BackingStore for PanickingStore {
    async fn load(&self) -> Vec<Task> {
        panic!("store exploded")
    }

    async fn store(&self, _tasks: &[Task]) -> Result<(), StoreError> {
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "panicking"
    }
}
