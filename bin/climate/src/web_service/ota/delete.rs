use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::web_service::{AppState, ServiceError};

pub async fn delete(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let removed = state.registry.delete().await?;

    let message = if removed == 0 {
        "no firmware to delete"
    } else {
        "firmware deleted"
    };

    Ok(Json(json!({ "success": true, "message": message })))
}
