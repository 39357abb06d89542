//! Shared utilities for integration tests.

use std::time::Duration;

use auth_service::config::ServerConfig;
use auth_service::http::api;
use auth_service::lifecycle::{start, ServerHandle, Shutdown};
use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Config bound to an ephemeral port.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        port: "0".into(),
        ..ServerConfig::default()
    }
}

/// Service routes plus `/slow/{ms}` and `/panic` test handlers.
pub fn test_routes() -> Router {
    api::router()
        .route("/slow/{ms}", get(slow))
        .route("/panic", get(panic_handler))
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "slept_ms": ms }))
}

async fn panic_handler() -> &'static str {
    panic!("handler fault")
}

/// A started server with its token and base URL.
#[allow(dead_code)]
pub struct TestServer {
    pub handle: ServerHandle,
    pub shutdown: Shutdown,
    pub base_url: String,
}

#[allow(dead_code)]
pub async fn start_server(config: ServerConfig) -> TestServer {
    let shutdown = Shutdown::new();
    let handle = start(&config, test_routes(), &shutdown)
        .await
        .expect("server should start");
    let base_url = format!("http://127.0.0.1:{}", handle.local_addr().port());

    TestServer {
        handle,
        shutdown,
        base_url,
    }
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(20))
        .build()
        .unwrap()
}
