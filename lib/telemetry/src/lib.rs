mod error;
mod history;
mod normalizer;
mod reading;
mod service;
mod statistics;

pub use error::Error;
pub use history::{HistoryBuffer, DEFAULT_CAPACITY};
pub use normalizer::{normalize, normalize_at};
pub use reading::{LedStates, Reading, DEFAULT_SYSTEM_STATE, UNKNOWN};
pub use service::IngestService;
pub use statistics::Statistics;

pub type Result<T> = std::result::Result<T, Error>;
