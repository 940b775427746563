use std::fmt;

use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    Attempt,
    Established,
    Failed,
    Lost,
}

impl ConnectionState {
    /// Next state after `event`. Events that make no sense in the current
    /// state leave it unchanged.
    pub fn on(self, event: ConnectionEvent) -> ConnectionState {
        use ConnectionEvent::*;
        use ConnectionState::*;

        match (self, event) {
            (Disconnected, Attempt) => Connecting,
            (Connecting, Established) => Connected,
            (_, Failed) | (_, Lost) => Disconnected,
            (state, _) => state,
        }
    }

    pub fn is_connected(&self) -> bool {
        *self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}
