// src/handlers/mod.rs

pub mod auth;
pub mod interaction;
pub mod posts;
pub mod profile;

use axum::{Json, response::IntoResponse};

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
