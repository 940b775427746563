use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Tried in order; the first match wins. A trailing `.patch` is kept in the
// extracted text but doesn't take part in ordering.
static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)version[_-]?([0-9]+\.[0-9]+(?:\.[0-9]+)?)",
        r"(?i)firmware[_-]?([0-9]+\.[0-9]+(?:\.[0-9]+)?)",
        r"(?i)v([0-9]+\.[0-9]+(?:\.[0-9]+)?)",
        r"([0-9]+\.[0-9]+(?:\.[0-9]+)?)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("version pattern is valid"))
    .collect()
});

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const ZERO: Version = Version { major: 0, minor: 0 };

    /// Finds the version text inside a free-form string such as
    /// `firmware-1.2.bin` or `v2.0.1`.
    pub fn extract(text: &str) -> Option<&str> {
        PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|captures| captures.get(1))
                .map(|found| found.as_str())
        })
    }

    pub fn try_parse(text: &str) -> Option<Version> {
        let mut parts = Self::extract(text)?.split('.');

        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;

        Some(Version { major, minor })
    }

    /// Like [`Version::try_parse`], but unparseable input becomes `0.0`.
    pub fn parse(text: &str) -> Version {
        Self::try_parse(text).unwrap_or(Self::ZERO)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}
