use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use log::info;
use serde_json::json;

use crate::web_service::{AppState, ServiceError};

/// Feeds a fixed sample through the same path as broker messages.
pub async fn test_data(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let payload = json!({
        "temperatura": "25.5",
        "humedad": "60.0",
        "led_amarillo": "1",
        "led_verde": "0",
        "led_rojo": "0",
        "estado": "TEST",
        "timestamp": Utc::now().timestamp().to_string(),
        "version": "1.0",
        "uuid": "2020171026",
    });

    let payload = serde_json::to_vec(&payload).map_err(crate::Error::from)?;
    let reading = state.ingest.ingest(&payload).await?;

    info!("injected test reading {:?}", reading);

    Ok(Json(json!({
        "success": true,
        "message": "test data added",
        "data": reading,
    })))
}
