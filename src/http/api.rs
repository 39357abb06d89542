//! Application routes.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::health;

pub const API_V1_PREFIX: &str = "/api/v1/";

#[derive(Debug, Serialize)]
pub struct ApiIndex {
    pub message: &'static str,
    pub status: &'static str,
}

/// Routes served by the auth service, without middleware.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(API_V1_PREFIX, get(v1_index))
        .route("/api/v1", get(v1_redirect))
}

async fn v1_index() -> Json<ApiIndex> {
    Json(ApiIndex {
        message: "Auth Service API v1",
        status: "running",
    })
}

// Trailing-slash redirect.
async fn v1_redirect() -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, API_V1_PREFIX)],
    )
        .into_response()
}
