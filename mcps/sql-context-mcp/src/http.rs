//! Plain HTTP routes served next to the MCP endpoint

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Routes merged into the MCP host router
pub fn routes() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
