//! Liveness endpoint.
//!
//! Returns 200 whenever the process can answer HTTP. It checks nothing
//! else; there are no dependencies to probe.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub time: DateTime<Utc>,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
        time: Utc::now(),
    })
}
