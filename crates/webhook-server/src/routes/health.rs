//! Health check endpoint.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "bot-instagram-forefy";

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

/// Health check endpoint.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
