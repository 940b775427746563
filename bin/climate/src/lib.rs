mod config;
mod error;
mod heartbeat;
mod ingest;
mod web_service;

pub use config::Config;
pub use error::Error;
pub use heartbeat::heartbeat;
pub use ingest::ingest_worker;
pub use web_service::{router, AppState};

pub type ErasedError = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, ErasedError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
