//! Error types for the task API.
//!
//! `StoreError` covers backing-store failures. `ApiError` is what a handler
//! returns, and it decides the status code and the message the caller sees.
//! Internal detail is logged and never put in a response body.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use shared::{ErrorBody, ERR_INTERNAL, ERR_INVALID_JSON, ERR_SAVE_FAILED, ERR_TASKS_NOT_ARRAY};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Failures surfaced to API callers. `Display` is the caller-facing message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", ERR_INVALID_JSON)]
    InvalidJson,

    #[error("{}", ERR_TASKS_NOT_ARRAY)]
    TasksNotArray,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("{}", ERR_SAVE_FAILED)]
    SaveFailed(#[source] StoreError),

    #[error("{}", ERR_INTERNAL)]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::TasksNotArray => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::SaveFailed(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::SaveFailed(source) = &self {
            tracing::error!(error = %source, "failed to save tasks");
        }
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
