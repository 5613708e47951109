//! Handlers for the `/api/tasks` resource.
//!
//! The resource only supports reading the whole list and replacing the whole
//! list. Replace receives the complete request body before doing anything.

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use shared::{duplicate_ids, normalize_all, ListResponse, ReplaceResponse};

use crate::error::ApiError;
use crate::store::BackingStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BackingStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }
}

/// `GET`: the stored list. Store read problems come back as an empty list.
pub async fn list_tasks(State(state): State<AppState>) -> Json<ListResponse> {
    let tasks = state.store.load().await;
    tracing::debug!(count = tasks.len(), "listing tasks");
    Json(ListResponse::new(tasks))
}

/// `POST`: normalizes the submitted list and overwrites the store with it.
pub async fn replace_tasks(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ReplaceResponse>, ApiError> {
    let body = body.map_err(body_rejection)?;
    let submitted = parse_submission(&body)?;
    let tasks = normalize_all(&submitted, Utc::now());

    let duplicates = duplicate_ids(&tasks);
    if !duplicates.is_empty() {
        let ids: Vec<String> = duplicates.iter().map(ToString::to_string).collect();
        tracing::warn!(duplicates = ?ids, "accepting task list with duplicate ids");
    }

    state.store.store(&tasks).await.map_err(ApiError::SaveFailed)?;
    tracing::info!(count = tasks.len(), "tasks replaced");

    Ok(Json(ReplaceResponse::new(tasks)))
}

/// `OPTIONS`: CORS preflight. Empty 200; the CORS headers come from the
/// router's header layers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    tracing::debug!(%method, "rejecting unsupported method");
    ApiError::MethodNotAllowed(method)
}

/// Turns a panic inside a handler into the generic 500 reply.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(%detail, "handler panicked");
    ApiError::Internal.into_response()
}

fn body_rejection(rejection: BytesRejection) -> ApiError {
    tracing::warn!(error = %rejection, "error reading request body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::InvalidJson
    }
}

/// Extracts the `tasks` array from a raw body.
///
/// A body that is not JSON, or is JSON `null`, is invalid. Any other body
/// without an array under `tasks` is rejected as a non-array.
fn parse_submission(body: &[u8]) -> Result<Vec<Value>, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|error| {
        tracing::warn!(%error, "error parsing request body");
        ApiError::InvalidJson
    })?;

    match value {
        Value::Null => Err(ApiError::InvalidJson),
        Value::Object(mut fields) => match fields.remove("tasks") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::TasksNotArray),
        },
        _ => Err(ApiError::TasksNotArray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"invalid json".as_slice())]
    #[case(b"".as_slice())]
    #[case(b"null".as_slice())]
    #[case(br#"{"tasks": [}"#.as_slice())]
    fn unparsable_bodies_are_invalid_json(#[case] body: &[u8]) {
        assert!(matches!(parse_submission(body), Err(ApiError::InvalidJson)));
    }

    #[rstest]
    #[case(br#"{"tasks": "invalid"}"#.as_slice())]
    #[case(br#"{"tasks": {"0": {}}}"#.as_slice())]
    #[case(br#"{"tasks": null}"#.as_slice())]
    #[case(br#"{}"#.as_slice())]
    #[case(b"[1, 2]".as_slice())]
    #[case(b"42".as_slice())]
    fn bodies_without_a_tasks_array_are_rejected(#[case] body: &[u8]) {
        assert!(matches!(parse_submission(body), Err(ApiError::TasksNotArray)));
    }

    #[test]
    fn tasks_array_is_extracted_in_order() {
        let items = parse_submission(br#"{"tasks": [{"text": "a"}, 7, null], "extra": true}"#).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["text"], "a");
        assert_eq!(items[1], 7);
        assert!(items[2].is_null());
    }

    #[test]
    fn panic_response_is_generic_500() {
        let response = panic_response(Box::new("secret detail".to_string()));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
