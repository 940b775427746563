use std::fmt;

#[derive(Debug)]
pub enum Error {
    InvalidFormat(String),
    TooLarge { limit: u64 },
    NotFound,
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(reason) => write!(f, "invalid firmware: {reason}"),
            Self::TooLarge { limit } => {
                write!(f, "firmware exceeds the maximum size of {limit} bytes")
            }
            Self::NotFound => write!(f, "no firmware available"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for Error {}
