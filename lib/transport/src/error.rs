use std::fmt;

#[derive(Debug)]
pub enum Error {
    Mqtt(paho_mqtt::Error),
}

impl From<paho_mqtt::Error> for Error {
    fn from(err: paho_mqtt::Error) -> Self {
        Self::Mqtt(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mqtt(err) => write!(f, "mqtt error: {err}"),
        }
    }
}

impl std::error::Error for Error {}
