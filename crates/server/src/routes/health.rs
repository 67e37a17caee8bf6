use axum::response::IntoResponse;
use axum::Json;
use chrono::SecondsFormat;
use serde_json::json;

/// Health check endpoint (liveness)
/// Returns 200 while the process is serving requests
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Product CRUD API is running",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
