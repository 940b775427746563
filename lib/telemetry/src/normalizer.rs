use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{Error, LedStates, Reading, Result, DEFAULT_SYSTEM_STATE, UNKNOWN};

/// Accepted keys for one semantic field, localized spelling first.
struct Field(&'static [&'static str]);

const TEMPERATURE: Field = Field(&["temperatura", "temperature"]);
const HUMIDITY: Field = Field(&["humedad", "humidity"]);
const LED_AMBER: Field = Field(&["led_amarillo", "led_amber"]);
const LED_GREEN: Field = Field(&["led_verde", "led_green"]);
const LED_RED: Field = Field(&["led_rojo", "led_red"]);
const SYSTEM_STATE: Field = Field(&["estado", "state"]);
const TIMESTAMP: Field = Field(&["timestamp"]);
const DEVICE_VERSION: Field = Field(&["version"]);
const DEVICE_ID: Field = Field(&["uuid", "device_id"]);

impl Field {
    fn lookup<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a Value> {
        self.0
            .iter()
            .filter_map(|key| object.get(*key))
            .find(|value| !value.is_null())
    }
}

/// Parses an inbound telemetry message into a [`Reading`], stamping it with the
/// current wall-clock time when the device didn't send a timestamp.
pub fn normalize(payload: &[u8]) -> Result<Reading> {
    normalize_at(payload, Utc::now().timestamp())
}

pub fn normalize_at(payload: &[u8], now: i64) -> Result<Reading> {
    let object = match serde_json::from_slice::<Value>(payload)? {
        Value::Object(object) => object,
        _ => return Err(Error::NotAnObject),
    };

    Ok(Reading {
        temperature: TEMPERATURE.lookup(&object).and_then(as_number),
        humidity: HUMIDITY.lookup(&object).and_then(as_number),
        led_states: LedStates {
            amber: LED_AMBER.lookup(&object).is_some_and(as_switch),
            green: LED_GREEN.lookup(&object).is_some_and(as_switch),
            red: LED_RED.lookup(&object).is_some_and(as_switch),
        },
        system_state: SYSTEM_STATE
            .lookup(&object)
            .and_then(as_text)
            .unwrap_or_else(|| DEFAULT_SYSTEM_STATE.to_string()),
        timestamp: TIMESTAMP
            .lookup(&object)
            .and_then(as_timestamp)
            .filter(|seconds| DateTime::from_timestamp(*seconds, 0).is_some())
            .unwrap_or(now),
        device_version: DEVICE_VERSION
            .lookup(&object)
            .and_then(as_text)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        device_id: DEVICE_ID
            .lookup(&object)
            .and_then(as_text)
            .unwrap_or_else(|| UNKNOWN.to_string()),
    })
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

// anything that isn't a non-zero number means "off"
fn as_switch(value: &Value) -> bool {
    match value {
        Value::Bool(on) => *on,
        _ => as_number(value).is_some_and(|number| number != 0.0),
    }
}

fn as_timestamp(value: &Value) -> Option<i64> {
    if let Value::Number(number) = value {
        if let Some(seconds) = number.as_i64() {
            return Some(seconds);
        }
    }

    if let Value::String(text) = value {
        if let Ok(seconds) = text.trim().parse() {
            return Some(seconds);
        }
    }

    as_number(value).map(|seconds| seconds.trunc() as i64)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_localized_payload() {
        let reading = normalize_at(
            &payload(json!({
                "temperatura": "25.5",
                "humedad": "60.0",
                "led_amarillo": "1",
            })),
            1736899200,
        )
        .unwrap();

        assert_eq!(reading.temperature, Some(25.5));
        assert_eq!(reading.humidity, Some(60.0));
        assert_eq!(
            reading.led_states,
            LedStates {
                amber: true,
                green: false,
                red: false
            }
        );
        assert_eq!(reading.system_state, "IDLE");
        assert_eq!(reading.timestamp, 1736899200);
        assert_eq!(reading.device_version, UNKNOWN);
        assert_eq!(reading.device_id, UNKNOWN);
    }

    #[test]
    fn test_english_payload() {
        let reading = normalize_at(
            &payload(json!({
                "temperature": 21.25,
                "humidity": 40,
                "led_green": 1,
                "led_red": true,
                "state": "COOLING",
                "timestamp": 1700000000,
                "version": "1.1",
                "device_id": "esp32-kitchen",
            })),
            0,
        )
        .unwrap();

        assert_eq!(reading.temperature, Some(21.25));
        assert_eq!(reading.humidity, Some(40.0));
        assert!(!reading.led_states.amber);
        assert!(reading.led_states.green);
        assert!(reading.led_states.red);
        assert_eq!(reading.system_state, "COOLING");
        assert_eq!(reading.timestamp, 1700000000);
        assert_eq!(reading.device_version, "1.1");
        assert_eq!(reading.device_id, "esp32-kitchen");
    }

    #[test]
    fn test_localized_key_wins() {
        let reading = normalize_at(
            &payload(json!({
                "temperature": 30.0,
                "temperatura": 19.5,
                "state": "COOLING",
                "estado": "HEATING",
                "humidity": 55,
                "humedad": null,
            })),
            0,
        )
        .unwrap();

        assert_eq!(reading.temperature, Some(19.5));
        assert_eq!(reading.system_state, "HEATING");
        assert_eq!(reading.humidity, Some(55.0));
    }

    #[test]
    fn test_missing_numbers_are_absent() {
        let reading = normalize_at(
            &payload(json!({ "temperatura": "n/a", "estado": "" })),
            0,
        )
        .unwrap();

        assert_eq!(reading.temperature, None);
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.system_state, DEFAULT_SYSTEM_STATE);
    }

    #[test]
    fn test_led_coercion() {
        let reading = normalize_at(
            &payload(json!({
                "led_amarillo": "on",
                "led_verde": [1],
                "led_rojo": "0",
            })),
            0,
        )
        .unwrap();

        assert_eq!(reading.led_states, LedStates::default());
    }

    #[test]
    fn test_timestamp_variants() {
        let text = normalize_at(&payload(json!({ "timestamp": "1700000001" })), 0).unwrap();
        assert_eq!(text.timestamp, 1700000001);

        let float = normalize_at(&payload(json!({ "timestamp": 1700000002.9 })), 0).unwrap();
        assert_eq!(float.timestamp, 1700000002);

        let garbage = normalize_at(&payload(json!({ "timestamp": "soon" })), 42).unwrap();
        assert_eq!(garbage.timestamp, 42);
    }

    #[test]
    fn test_unrepresentable_timestamp_uses_now() {
        for timestamp in [
            json!(i64::MIN),
            json!(i64::MAX),
            json!("-9223372036854775808"),
            json!(1e300),
        ] {
            let reading = normalize_at(&payload(json!({ "timestamp": timestamp })), 42).unwrap();
            assert_eq!(reading.timestamp, 42, "{timestamp}");
        }
    }

    #[test]
    fn test_missing_timestamp_uses_wall_clock() {
        let before = Utc::now().timestamp();
        let first = normalize(br#"{"temperatura": 20}"#).unwrap();
        let second = normalize(br#"{"temperatura": 20}"#).unwrap();
        let after = Utc::now().timestamp();

        assert!(first.timestamp >= before && first.timestamp <= after);
        assert!((second.timestamp - first.timestamp).abs() <= 1);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            normalize(b"temperatura=25"),
            Err(Error::MalformedPayload(_))
        ));
        assert!(matches!(normalize(b"[1, 2]"), Err(Error::NotAnObject)));
        assert!(matches!(normalize(b"\xff\xfe"), Err(Error::MalformedPayload(_))));
    }
}
