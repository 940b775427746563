use std::sync::Arc;

use log::{debug, error, info};
use telemetry::IngestService;
use tokio::sync::mpsc::UnboundedReceiver;
use transport::Inbound;

/// Drains broker messages into the history in arrival order. Returns once
/// every sender is gone.
pub async fn ingest_worker(mut rx: UnboundedReceiver<Inbound>, ingest: Arc<IngestService>) {
    while let Some(message) = rx.recv().await {
        match ingest.ingest(&message.payload).await {
            Ok(reading) => debug!(
                "[{}] {:?}: {:?}°C {:?}% {}",
                message.topic,
                message.source,
                reading.temperature,
                reading.humidity,
                reading.system_state
            ),
            Err(err) => error!("dropping message from {}: {}", message.topic, err),
        }
    }

    info!("ingest queue closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use transport::Source;

    fn inbound(payload: &str) -> Inbound {
        Inbound {
            topic: "/class/idgs09/ABC123".to_string(),
            source: Some(Source::Device),
            payload: payload.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_malformed_messages_are_dropped() {
        let ingest = Arc::new(IngestService::new(10));
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(inbound(r#"{"temperatura": "20.0", "timestamp": 1}"#)).unwrap();
        tx.send(inbound("not json")).unwrap();
        tx.send(inbound("[]")).unwrap();
        tx.send(inbound(r#"{"temperatura": "21.0", "timestamp": 2}"#)).unwrap();
        drop(tx);

        ingest_worker(rx, ingest.clone()).await;

        let history = ingest.recent(10).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].temperature, Some(20.0));
        assert_eq!(history[1].temperature, Some(21.0));
        assert_eq!(ingest.current().await, history.last().cloned());
    }
}
