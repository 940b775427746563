use std::fmt;

#[derive(Debug)]
pub enum Error {
    MalformedPayload(serde_json::Error),
    NotAnObject,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPayload(err) => write!(f, "malformed payload: {err}"),
            Self::NotAnObject => write!(f, "malformed payload: expected a key/value object"),
        }
    }
}

impl std::error::Error for Error {}
