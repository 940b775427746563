mod advice;
mod artifact;
mod changelog;
mod error;
mod registry;
mod version;

pub use advice::{needs_update, UpdateAdvice};
pub use artifact::{latest_by_version, FirmwareArtifact};
pub use changelog::{ChangelogEntry, CHANGELOG};
pub use error::Error;
pub use registry::{FirmwareRegistry, Upload, FIRMWARE_EXTENSION, MAX_FIRMWARE_SIZE};
pub use version::{compare, Version};

pub type Result<T> = std::result::Result<T, Error>;

pub const UNKNOWN_VERSION: &str = "unknown";
