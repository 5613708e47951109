use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, MethodRouter},
    Router,
};
use shared::TASKS_PATH;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::api::{
    list_tasks, method_not_allowed, panic_response, preflight, replace_tasks, AppState,
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Largest accepted request body. Bigger bodies get a 413 JSON error.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// axum answers HEAD with the GET handler unless HEAD has its own route.
fn tasks_resource() -> MethodRouter<AppState> {
    get(list_tasks)
        .head(method_not_allowed)
        .post(replace_tasks)
        .options(preflight)
        .fallback(method_not_allowed)
}

/// The tasks resource alone. Anything under `/api/tasks` is served by the
/// same handlers, and every response carries the CORS headers, including
/// rejections and caught panics.
pub fn api_router(state: AppState) -> Router {
    let cors_and_panics = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(CatchPanicLayer::custom(panic_response));

    Router::new()
        .route(TASKS_PATH, tasks_resource())
        .route(&format!("{TASKS_PATH}/*rest"), tasks_resource())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_and_panics)
        .with_state(state)
}

/// Full application: the API plus static front-end files for every other
/// path, with request tracing.
pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    api_router(state)
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
}
