use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ChangelogEntry {
    pub version: &'static str,
    pub date: &'static str,
    pub changes: &'static [&'static str],
}

/// Release notes shown by the dashboard, newest first.
pub const CHANGELOG: &[ChangelogEntry] = &[
    ChangelogEntry {
        version: "1.1.0",
        date: "2025-01-15",
        changes: &[
            "Improved Wi-Fi connection stability",
            "Lower power consumption",
            "Fixed sensor reading errors",
            "New diagnostic features",
        ],
    },
    ChangelogEntry {
        version: "1.0.0",
        date: "2025-01-01",
        changes: &[
            "Initial release",
            "Temperature driven control of 3 LEDs",
            "MQTT and HTTPS connectivity",
            "Built-in web dashboard",
        ],
    },
];
