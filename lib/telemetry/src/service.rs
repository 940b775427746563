use log::debug;
use tokio::sync::Mutex;

use crate::{normalize, HistoryBuffer, Reading, Result, Statistics};

/// Owns the live reading and the bounded history. Both are updated under one
/// lock so readers never see a reading in one but not the other.
pub struct IngestService {
    capacity: usize,
    state: Mutex<State>,
}

struct State {
    current: Option<Reading>,
    history: HistoryBuffer,
}

impl IngestService {
    pub fn new(capacity: usize) -> Self {
        let history = HistoryBuffer::with_capacity(capacity);

        Self {
            capacity: history.capacity(),
            state: Mutex::from(State {
                current: None,
                history,
            }),
        }
    }

    pub async fn ingest(&self, payload: &[u8]) -> Result<Reading> {
        let reading = normalize(payload)?;
        self.append(reading.clone()).await;

        Ok(reading)
    }

    pub async fn append(&self, reading: Reading) {
        let mut state = self.state.lock().await;

        state.history.push(reading.clone());
        state.current = Some(reading);

        debug!(
            "history: {}/{} readings",
            state.history.len(),
            state.history.capacity()
        );
    }

    pub async fn current(&self) -> Option<Reading> {
        self.state.lock().await.current.clone()
    }

    pub async fn recent(&self, n: usize) -> Vec<Reading> {
        self.state.lock().await.history.recent(n)
    }

    pub async fn statistics(&self) -> Statistics {
        self.state.lock().await.history.statistics()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.history.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for IngestService {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CAPACITY)
    }
}
