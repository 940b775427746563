use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::web_service::AppState;

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": state.ingest.statistics().await,
    }))
}
