use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::info;
use serde_json::json;

use crate::web_service::{failure, AppState, ServiceError};

pub async fn force_update(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let artifact = match state.registry.request_update().await {
        Ok(artifact) => artifact,
        Err(firmware::Error::NotFound) => {
            return Ok(failure(
                StatusCode::BAD_REQUEST,
                "no firmware available to update to",
            ))
        }
        Err(err) => return Err(err.into()),
    };

    info!("update to firmware {} requested", artifact.version);

    Ok(Json(json!({
        "success": true,
        "message": "update requested, the device will pick it up on its next check",
        "firmware": artifact,
    }))
    .into_response())
}
