mod connection;
mod error;
mod state;
mod subscription;
mod topic;

pub use connection::{Connection, ConnectionOptions, Inbound};
pub use error::Error;
pub use state::{ConnectionEvent, ConnectionState};
pub use subscription::{Source, Subscription};
pub use topic::topic_matches;

pub type Result<T> = std::result::Result<T, Error>;
