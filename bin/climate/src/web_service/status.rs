use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::web_service::{to_iso, AppState};
use crate::VERSION;

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let mqtt = *state.connection.borrow();

    Json(json!({
        "success": true,
        "server": "climate",
        "version": VERSION,
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "timestamp": to_iso(Utc::now()),
        "dataPoints": state.ingest.len().await,
        "mqtt": mqtt,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use transport::ConnectionState;

    use crate::web_service::testing::*;

    #[tokio::test]
    async fn test_status() {
        let app = TestApp::new();
        app.ingest(json!({ "temperatura": 21 })).await;
        app.ingest(json!({ "temperatura": 22 })).await;

        let body = json_body(app.get("/api/status").await).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["server"], "climate");
        assert_eq!(body["version"], crate::VERSION);
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        assert!(body["timestamp"].is_string());
        assert_eq!(body["dataPoints"], 2);
        assert_eq!(body["mqtt"], "connected");
    }

    #[tokio::test]
    async fn test_reports_connection_state() {
        let app = TestApp::new();
        app.connection.send_replace(ConnectionState::Connecting);

        let body = json_body(app.get("/api/status").await).await;
        assert_eq!(body["mqtt"], "connecting");
    }
}
