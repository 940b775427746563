use std::fmt;

#[derive(Debug)]
pub enum Error {
    Config(String),
    Telemetry(telemetry::Error),
    Firmware(firmware::Error),
    Multipart(String),
    Json(serde_json::Error),
}

impl From<telemetry::Error> for Error {
    fn from(err: telemetry::Error) -> Self {
        Self::Telemetry(err)
    }
}

impl From<firmware::Error> for Error {
    fn from(err: firmware::Error) -> Self {
        Self::Firmware(err)
    }
}

impl From<axum::extract::multipart::MultipartError> for Error {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::Multipart(err.body_text())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(reason) => write!(f, "config error: {reason}"),
            Self::Telemetry(err) => write!(f, "telemetry error: {err}"),
            Self::Firmware(err) => write!(f, "firmware error: {err}"),
            Self::Multipart(reason) => write!(f, "multipart error: {reason}"),
            Self::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for Error {}
