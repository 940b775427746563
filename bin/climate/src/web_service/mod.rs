mod sensor {
    mod current;
    mod deprecated;
    mod history;
    mod stats;
    mod test_data;

    pub use current::current;
    pub use deprecated::deprecated;
    pub use history::history;
    pub use stats::stats;
    pub use test_data::test_data;
}

mod ota {
    mod delete;
    mod download;
    mod force_update;
    mod info;
    mod upload;
    mod versions;

    pub use delete::delete;
    pub use download::{check, download};
    pub use force_update::force_update;
    pub use info::info;
    pub use upload::upload;
    pub use versions::versions;
}

mod status;

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use firmware::{FirmwareRegistry, MAX_FIRMWARE_SIZE};
use log::{error, info};
use serde_json::json;
use telemetry::IngestService;
use tokio::sync::watch;
use transport::ConnectionState;

use crate::Error;

// multipart framing and the version field on top of the largest accepted binary
const UPLOAD_BODY_LIMIT: usize = 2 * MAX_FIRMWARE_SIZE as usize;

#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestService>,
    pub registry: Arc<FirmwareRegistry>,
    pub connection: watch::Receiver<ConnectionState>,
    pub started_at: Instant,
}

pub struct ServiceError(Error, uuid::Uuid);

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response<Body> {
        let status = match &self.0 {
            Error::Firmware(firmware::Error::InvalidFormat(_)) | Error::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Firmware(firmware::Error::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Firmware(firmware::Error::NotFound) => StatusCode::NOT_FOUND,
            _ => {
                error!("ServiceError[{}]: {}", self.1, self.0);
                return failure(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
            }
        };

        let message = match self.0 {
            Error::Firmware(err) => err.to_string(),
            Error::Multipart(reason) => reason,
            err => err.to_string(),
        };

        info!("ServiceError[{}]: {} {}", self.1, status, message);

        failure(status, message)
    }
}

impl From<Error> for ServiceError {
    fn from(value: Error) -> Self {
        ServiceError(value, uuid::Uuid::new_v4())
    }
}

impl From<firmware::Error> for ServiceError {
    fn from(value: firmware::Error) -> Self {
        ServiceError(Error::Firmware(value), uuid::Uuid::new_v4())
    }
}

impl From<telemetry::Error> for ServiceError {
    fn from(value: telemetry::Error) -> Self {
        ServiceError(Error::Telemetry(value), uuid::Uuid::new_v4())
    }
}

impl From<MultipartError> for ServiceError {
    fn from(value: MultipartError) -> Self {
        let error = if value.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::Firmware(firmware::Error::TooLarge {
                limit: MAX_FIRMWARE_SIZE,
            })
        } else {
            Error::from(value)
        };

        ServiceError(error, uuid::Uuid::new_v4())
    }
}

pub fn failure(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    let message: String = message.into();

    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

pub fn iso_timestamp(seconds: i64) -> Option<String> {
    DateTime::from_timestamp(seconds, 0).map(to_iso)
}

pub fn to_iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/sensor-data",
            get(sensor::current).post(sensor::deprecated),
        )
        .route("/api/sensor-history", get(sensor::history))
        .route("/api/sensor-stats", get(sensor::stats))
        .route("/api/test-data", post(sensor::test_data))
        .route("/api/status", get(status::status))
        .route("/api/firmware-versions", get(ota::versions))
        .route(
            "/api/ota/upload",
            post(ota::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/ota/firmware",
            get(ota::download).head(ota::check).delete(ota::delete),
        )
        .route("/api/ota/info", get(ota::info))
        .route("/api/ota/force-update", post(ota::force_update))
        .with_state(state)
}
