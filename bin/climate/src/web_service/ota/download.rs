use axum::extract::State;
use axum::http::header::{self, HeaderName};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use firmware::FirmwareArtifact;
use log::info;

use crate::web_service::{AppState, ServiceError};

const X_FIRMWARE_VERSION: HeaderName = HeaderName::from_static("x-firmware-version");
const X_FIRMWARE_MD5: HeaderName = HeaderName::from_static("x-firmware-md5");
const X_FIRMWARE_SIZE: HeaderName = HeaderName::from_static("x-firmware-size");
const X_FIRMWARE_FILENAME: HeaderName = HeaderName::from_static("x-firmware-filename");

fn firmware_headers(artifact: &FirmwareArtifact) -> Vec<(HeaderName, String)> {
    let file_name = artifact.filename.as_deref().unwrap_or("firmware.bin");

    let mut headers = vec![
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_LENGTH, artifact.size_bytes.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ),
        (X_FIRMWARE_VERSION, artifact.version.clone()),
        (X_FIRMWARE_MD5, artifact.checksum.clone()),
        (X_FIRMWARE_SIZE, artifact.size_bytes.to_string()),
        (X_FIRMWARE_FILENAME, file_name.to_string()),
    ];

    if let Some(uploaded_at) = artifact.uploaded_at {
        headers.push((
            header::LAST_MODIFIED,
            uploaded_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        ));
    }

    headers
}

fn with_headers(artifact: &FirmwareArtifact, mut response: Response) -> Response {
    for (name, value) in firmware_headers(artifact) {
        match value.parse() {
            Ok(value) => {
                response.headers_mut().insert(name, value);
            }
            Err(_) => info!("skipping unrepresentable {name} header {value:?}"),
        }
    }

    response
}

pub async fn download(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let (artifact, bytes) = state.registry.fetch_bytes().await?;

    info!(
        "serving firmware {} ({} bytes, md5 {})",
        artifact.version, artifact.size_bytes, artifact.checksum
    );

    Ok(with_headers(&artifact, bytes.into_response()))
}

/// Lets the device compare versions without pulling the binary.
pub async fn check(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let artifact = state.registry.current().await?;

    if !artifact.available {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    info!(
        "HEAD firmware: version {}, md5 {}",
        artifact.version, artifact.checksum
    );

    Ok(with_headers(&artifact, StatusCode::OK.into_response()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};

    use crate::web_service::testing::*;

    const FIRMWARE: &str = "/api/ota/firmware";

    #[tokio::test]
    async fn test_download() {
        let app = TestApp::new();
        let bytes: Vec<u8> = (0..4096).map(|i| (i % 256) as u8).collect();
        app.state
            .registry
            .store("climate.bin", &bytes, "1.1")
            .await
            .unwrap();

        let response = app.get(FIRMWARE).await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers().clone();
        assert_eq!(headers["x-firmware-version"], "1.1");
        assert_eq!(
            headers["x-firmware-md5"],
            format!("{:x}", md5::compute(&bytes)).as_str()
        );
        assert_eq!(headers["x-firmware-size"], "4096");
        assert_eq!(headers["x-firmware-filename"], "firmware-1.1.bin");
        assert_eq!(headers[header::CONTENT_LENGTH], "4096");
        assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"firmware-1.1.bin\""
        );
        assert!(headers[header::LAST_MODIFIED]
            .to_str()
            .unwrap()
            .ends_with(" GMT"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), bytes.as_slice());
    }

    #[tokio::test]
    async fn test_download_without_firmware() {
        let app = TestApp::new();

        let response = app.get(FIRMWARE).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_head() {
        let app = TestApp::new();

        let head = || Request::head(FIRMWARE).body(Body::empty()).unwrap();

        let response = app.send(head()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        app.state
            .registry
            .store("climate.bin", b"abc", "1.2")
            .await
            .unwrap();

        let response = app.send(head()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-firmware-version"], "1.2");
        assert_eq!(
            response.headers()["x-firmware-md5"],
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "3");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_download_clears_update_request() {
        let app = TestApp::new();
        app.state
            .registry
            .store("climate.bin", b"abc", "1.2")
            .await
            .unwrap();
        app.state.registry.request_update().await.unwrap();

        app.send(Request::head(FIRMWARE).body(Body::empty()).unwrap())
            .await;
        assert!(app.state.registry.update_requested_at().await.is_some());

        app.get(FIRMWARE).await;
        assert!(app.state.registry.update_requested_at().await.is_none());
    }
}
