//! Health check handler.

use axum::response::IntoResponse;
use axum::Json;

/// Liveness probe. Always returns `200` if the process is accepting
/// HTTP requests at all.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
