use serde::Serialize;

use crate::{FirmwareArtifact, Version};

/// Whether the device should pull the stored firmware, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdvice {
    pub needed: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_file: Option<String>,
}

impl UpdateAdvice {
    fn not_needed(reason: impl Into<String>) -> Self {
        Self {
            needed: false,
            reason: reason.into(),
            recommended_file: None,
        }
    }

    pub fn for_versions(device_version: &str, latest_version: &str) -> Self {
        let Some(current) = Version::try_parse(device_version) else {
            return Self::not_needed(format!(
                "insufficient information: device version {device_version:?} is not recognized"
            ));
        };

        let Some(latest) = Version::try_parse(latest_version) else {
            return Self::not_needed(format!(
                "insufficient information: firmware version {latest_version:?} is not recognized"
            ));
        };

        if latest > current {
            Self {
                needed: true,
                reason: format!("version {latest_version} available (current: {device_version})"),
                recommended_file: None,
            }
        } else {
            Self::not_needed("firmware is up to date")
        }
    }

    pub fn for_artifact(device_version: Option<&str>, latest: Option<&FirmwareArtifact>) -> Self {
        let Some(device_version) = device_version else {
            return Self::not_needed("insufficient information: device version is unknown");
        };

        match latest {
            Some(artifact) if artifact.available => Self {
                recommended_file: artifact.filename.clone(),
                ..Self::for_versions(device_version, &artifact.version)
            },
            _ => Self::not_needed("no firmware available"),
        }
    }
}

pub fn needs_update(device_version: &str, latest_version: &str) -> bool {
    UpdateAdvice::for_versions(device_version, latest_version).needed
}
