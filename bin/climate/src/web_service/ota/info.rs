use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use firmware::{CHANGELOG, UNKNOWN_VERSION};
use serde_json::json;

use crate::web_service::{to_iso, AppState, ServiceError};

pub async fn info(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let firmware = state.registry.current().await?;
    let current_version = state
        .ingest
        .current()
        .await
        .map(|reading| reading.device_version)
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
    let update_requested_at = state.registry.update_requested_at().await.map(to_iso);

    Ok(Json(json!({
        "success": true,
        "firmware": firmware,
        "currentVersion": current_version,
        "updateRequestedAt": update_requested_at,
        "changelog": CHANGELOG,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::web_service::testing::*;

    #[tokio::test]
    async fn test_without_firmware() {
        let app = TestApp::new();
        let body = json_body(app.get("/api/ota/info").await).await;

        assert_eq!(body["success"], true);
        assert_eq!(
            body["firmware"],
            json!({
                "version": "0.0",
                "sizeBytes": 0,
                "checksum": "",
                "uploadedAt": null,
                "available": false,
            })
        );
        assert_eq!(body["currentVersion"], "unknown");
        assert_eq!(body["updateRequestedAt"], json!(null));
        assert_eq!(body["changelog"][0]["version"], "1.1.0");
        assert!(body["changelog"][0]["changes"].is_array());
    }

    #[tokio::test]
    async fn test_with_firmware_and_device() {
        let app = TestApp::new();
        app.state
            .registry
            .store("climate.bin", b"abc", "1.1")
            .await
            .unwrap();
        app.ingest(json!({ "temperatura": 20, "version": "1.0" })).await;
        app.state.registry.request_update().await.unwrap();

        let body = json_body(app.get("/api/ota/info").await).await;

        assert_eq!(body["firmware"]["version"], "1.1");
        assert_eq!(body["firmware"]["available"], true);
        assert_eq!(body["currentVersion"], "1.0");
        assert!(body["updateRequestedAt"].is_string());
    }
}
