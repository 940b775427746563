use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_STATE: &str = "IDLE";
pub const UNKNOWN: &str = "unknown";

/// One normalized telemetry sample.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub temperature: Option<f64>, // °C
    pub humidity: Option<f64>,    // percent
    pub led_states: LedStates,
    pub system_state: String,
    pub timestamp: i64, // s since epoch
    pub device_version: String,
    pub device_id: String,
}

#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LedStates {
    pub amber: bool,
    pub green: bool,
    pub red: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization() {
        let reading = Reading {
            temperature: Some(25.5),
            humidity: None,
            led_states: LedStates {
                amber: true,
                green: false,
                red: false,
            },
            system_state: "HEATING".to_string(),
            timestamp: 1736899200,
            device_version: "1.0".to_string(),
            device_id: "2020171026".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&reading).unwrap(),
            json!({
                "temperature": 25.5,
                "humidity": null,
                "ledStates": { "amber": true, "green": false, "red": false },
                "systemState": "HEATING",
                "timestamp": 1736899200,
                "deviceVersion": "1.0",
                "deviceId": "2020171026",
            })
        );
    }
}
