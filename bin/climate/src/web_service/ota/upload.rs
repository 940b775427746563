use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use log::info;
use serde_json::json;

use crate::web_service::{AppState, ServiceError};
use crate::Error;

/// Multipart upload with a `firmware` file field and an optional `version`
/// text field. The binary is streamed to disk chunk by chunk.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let mut upload = None;
    let mut version = String::new();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some("firmware") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mut pending = state.registry.begin_upload(&file_name).await?;

                while let Some(chunk) = field.chunk().await? {
                    pending.write(&chunk).await?;
                }

                upload = Some(pending);
            }
            Some("version") => version = field.text().await?,
            _ => (),
        }
    }

    let Some(upload) = upload else {
        return Err(Error::Multipart("no firmware file provided".to_string()).into());
    };

    let artifact = upload.finish(&version).await?;

    info!(
        "firmware {} uploaded ({} bytes)",
        artifact.version, artifact.size_bytes
    );

    Ok(Json(json!({
        "success": true,
        "message": "firmware uploaded successfully",
        "firmware": artifact,
    })))
}
