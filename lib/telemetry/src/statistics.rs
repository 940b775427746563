use serde::Serialize;

use crate::Reading;

/// Aggregates over the retained history. Temperature and humidity skip absent
/// samples independently; `count` is the number of retained readings.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub avg_temp: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub count: usize,
}

impl Statistics {
    pub fn from_readings<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> Self {
        let mut temperature = Accumulator::default();
        let mut humidity = Accumulator::default();
        let mut count = 0;

        for reading in readings {
            count += 1;

            if let Some(value) = reading.temperature {
                temperature.add(value);
            }
            if let Some(value) = reading.humidity {
                humidity.add(value);
            }
        }

        Statistics {
            min_temp: temperature.min,
            max_temp: temperature.max,
            avg_temp: temperature.mean().map(round_to_tenth),
            avg_humidity: humidity.mean().map(round_to_tenth),
            count,
        }
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    len: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.len += 1;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    fn mean(&self) -> Option<f64> {
        (self.len > 0).then(|| self.sum / self.len as f64)
    }
}

// half away from zero
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
