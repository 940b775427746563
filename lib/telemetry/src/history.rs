use std::collections::VecDeque;

use crate::{Reading, Statistics};

pub const DEFAULT_CAPACITY: usize = 100;

/// Fixed-capacity FIFO of readings in arrival order, oldest first.
#[derive(Debug)]
pub struct HistoryBuffer {
    capacity: usize,
    readings: VecDeque<Reading>,
}

impl HistoryBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, reading: Reading) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }

        self.readings.push_back(reading);
    }

    /// Copies out the last `min(n, len)` readings, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Reading> {
        let skip = self.readings.len().saturating_sub(n);
        self.readings.iter().skip(skip).cloned().collect()
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_readings(&self.readings)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
