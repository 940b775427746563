use axum::body::Bytes;
use axum::response::IntoResponse;
use axum::Json;
use log::warn;
use serde_json::json;

/// Readings arrive over MQTT now; the body is ignored.
pub async fn deprecated(body: Bytes) -> impl IntoResponse {
    warn!(
        "POST /api/sensor-data called, ignoring {} bytes; readings come from mqtt",
        body.len()
    );

    Json(json!({
        "success": true,
        "message": "endpoint kept for compatibility, readings are received over mqtt",
        "note": "the dashboard is updated automatically from the mqtt broker",
    }))
}
