//! Per-request fault boundary.
//!
//! A panic inside a handler is caught by `CatchPanicLayer`, logged on the
//! request span, and answered with a 500. The connection and the server
//! keep running.

use std::any::Any;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use tower_http::catch_panic::CatchPanicLayer;

use crate::http::response::error_response;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response<Body>;

pub fn recovery_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Recovered from panic in request handler");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_payload_maps_to_500() {
        let response = panic_response(Box::new(String::from("boom")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn opaque_payload_maps_to_500() {
        let response = panic_response(Box::new(42_u32));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
