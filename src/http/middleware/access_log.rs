//! Structured access logging.
//!
//! Plugs into `tower_http::trace::TraceLayer`: one span per request
//! carrying the request id, method and path, and one event per response
//! with status and latency.

use std::time::Duration;

use axum::http::{Request, Response};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Span;

use crate::http::request::request_id;

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl<B> MakeSpan<B> for AccessLog {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            request_id = %request_id(request).unwrap_or("-"),
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}

impl<B> OnResponse<B> for AccessLog {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status();
        let latency_ms = latency.as_secs_f64() * 1000.0;

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), latency_ms, "Request completed");
        } else {
            tracing::info!(status = status.as_u16(), latency_ms, "Request completed");
        }
    }
}
