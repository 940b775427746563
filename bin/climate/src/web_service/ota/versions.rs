use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use firmware::{latest_by_version, UpdateAdvice, UNKNOWN_VERSION};
use log::info;
use serde_json::json;

use crate::web_service::{iso_timestamp, to_iso, AppState, ServiceError};

// a device that reported within this window counts as online
const ONLINE_WINDOW_SECS: i64 = 300;

pub async fn versions(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let reading = state.ingest.current().await;
    let available = state.registry.list().await?;
    let latest = latest_by_version(&available);
    let now = Utc::now();

    let device_version = reading.as_ref().map(|reading| reading.device_version.as_str());
    let advice = UpdateAdvice::for_artifact(device_version, latest);

    info!(
        "firmware versions: device {}, {} stored",
        device_version.unwrap_or(UNKNOWN_VERSION),
        available.len()
    );

    let device = json!({
        "currentVersion": device_version.unwrap_or(UNKNOWN_VERSION),
        "deviceId": reading
            .as_ref()
            .map(|reading| reading.device_id.as_str())
            .unwrap_or(UNKNOWN_VERSION),
        "lastSeen": reading
            .as_ref()
            .and_then(|reading| iso_timestamp(reading.timestamp)),
        "isOnline": reading.as_ref().is_some_and(|reading| {
            now.timestamp().saturating_sub(reading.timestamp) < ONLINE_WINDOW_SECS
        }),
    });

    Ok(Json(json!({
        "success": true,
        "device": device,
        "comparison": {
            "needsUpdate": advice,
            "latestVersion": latest.map(|artifact| artifact.version.as_str()),
        },
        "availableFirmware": available,
        "timestamp": to_iso(now),
    })))
}
