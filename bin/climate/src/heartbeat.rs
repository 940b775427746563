use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::info;
use telemetry::IngestService;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use transport::ConnectionState;

pub async fn heartbeat(
    ingest: Arc<IngestService>,
    connection: watch::Receiver<ConnectionState>,
    period: Duration,
) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    timer.tick().await;

    loop {
        timer.tick().await;

        let retained = ingest.len().await;
        let last_timestamp = ingest.current().await.map(|reading| reading.timestamp);
        let state = *connection.borrow();

        info!(
            "{}",
            status_line(retained, state, last_timestamp, Utc::now().timestamp())
        );
    }
}

fn status_line(
    retained: usize,
    state: ConnectionState,
    last_timestamp: Option<i64>,
    now: i64,
) -> String {
    let since_last = match last_timestamp {
        Some(timestamp) => format!("{}s ago", now.saturating_sub(timestamp).max(0)),
        None => "N/A".to_string(),
    };

    format!("heartbeat: {retained} readings, mqtt {state}, last reading {since_last}")
}
