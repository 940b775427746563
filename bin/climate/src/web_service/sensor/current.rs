use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::web_service::{iso_timestamp, AppState};

pub async fn current(State(state): State<AppState>) -> impl IntoResponse {
    let reading = state.ingest.current().await;
    let last_update = reading
        .as_ref()
        .and_then(|reading| iso_timestamp(reading.timestamp));

    Json(json!({
        "success": true,
        "data": reading,
        "lastUpdate": last_update,
    }))
}
