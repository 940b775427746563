use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Version;

/// Metadata of one stored firmware binary.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareArtifact {
    pub version: String,
    pub size_bytes: u64,
    pub checksum: String, // md5, lowercase hex
    pub uploaded_at: Option<DateTime<Utc>>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl FirmwareArtifact {
    pub fn unavailable() -> Self {
        Self {
            version: Version::ZERO.to_string(),
            size_bytes: 0,
            checksum: String::new(),
            uploaded_at: None,
            available: false,
            filename: None,
        }
    }

    pub fn parsed_version(&self) -> Option<Version> {
        Version::try_parse(&self.version)
    }
}

/// Picks the artifact with the highest version. Artifacts without a
/// recognizable version only win when nothing else is stored.
pub fn latest_by_version(artifacts: &[FirmwareArtifact]) -> Option<&FirmwareArtifact> {
    artifacts
        .iter()
        .filter_map(|artifact| Some((artifact.parsed_version()?, artifact)))
        .max_by_key(|(version, _)| *version)
        .map(|(_, artifact)| artifact)
        .or_else(|| artifacts.first())
}
