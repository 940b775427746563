use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, error, info, warn};
use paho_mqtt as mqtt;
use tokio::sync::{mpsc, watch};
use tokio::time;

use crate::{ConnectionEvent, ConnectionState, Result, Source, Subscription};

#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    pub address: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub verify_certificate: bool,
    pub reconnect_interval: Duration,
}

/// A message received on one of the subscribed topics.
#[derive(Clone, Debug, PartialEq)]
pub struct Inbound {
    pub topic: String,
    pub source: Option<Source>,
    pub payload: Vec<u8>,
}

/// Broker connection that keeps itself alive for as long as [`Connection::run`]
/// is polled, resubscribing after every reconnect.
pub struct Connection {
    client: mqtt::AsyncClient,
    connect_options: mqtt::ConnectOptions,
    subscription: Subscription,
    reconnect_interval: Duration,
    state: watch::Sender<ConnectionState>,
}

impl Connection {
    pub fn new(options: ConnectionOptions, subscription: Subscription) -> Result<Connection> {
        let create_opts = mqtt::CreateOptionsBuilder::new_v3()
            .server_uri(&options.address)
            .client_id(&options.client_id)
            .finalize();

        let client = mqtt::AsyncClient::new(create_opts)?;

        let ssl_opts = mqtt::SslOptionsBuilder::new()
            .enable_server_cert_auth(options.verify_certificate)
            .finalize();

        let connect_options = mqtt::ConnectOptionsBuilder::new_v3()
            .keep_alive_interval(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(30))
            .clean_session(true)
            .ssl_options(ssl_opts)
            .user_name(options.username)
            .password(options.password)
            .finalize();

        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Connection {
            client,
            connect_options,
            subscription,
            reconnect_interval: options.reconnect_interval,
            state,
        })
    }

    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn apply(&self, event: ConnectionEvent) {
        let current = *self.state.borrow();
        let next = current.on(event);

        if next != current {
            debug!("mqtt {current} -> {next}");
            self.state.send_replace(next);
        }
    }

    /// Connects, subscribes and forwards every message to `sink` until the
    /// receiving side is dropped. Connection failures are retried forever
    /// with a fixed backoff.
    pub async fn run(mut self, sink: mpsc::UnboundedSender<Inbound>) -> Result<()> {
        let mut stream = self.client.get_stream(None);
        let (topics, qos) = self.subscription.topics_and_qos();

        loop {
            self.apply(ConnectionEvent::Attempt);

            if let Err(err) = self.client.connect(self.connect_options.clone()).await {
                error!("Error MQTT connecting: {}", err);
                self.apply(ConnectionEvent::Failed);
                time::sleep(self.reconnect_interval).await;
                continue;
            }

            self.apply(ConnectionEvent::Established);
            info!("connected mqtt");

            if let Err(err) = self.client.subscribe_many(&topics, &qos).await {
                error!("Error subscribing to {:?}: {}", topics, err);
                self.disconnect().await;
                self.apply(ConnectionEvent::Lost);
                time::sleep(self.reconnect_interval).await;
                continue;
            }

            info!("Subscribed to topics: {:?}", topics);

            loop {
                match stream.next().await {
                    Some(Some(msg)) => {
                        let inbound = Inbound {
                            topic: msg.topic().to_string(),
                            source: self.subscription.classify(msg.topic()),
                            payload: msg.payload().to_vec(),
                        };

                        if sink.send(inbound).is_err() {
                            info!("ingest queue closed, leaving mqtt");
                            self.disconnect().await;
                            self.apply(ConnectionEvent::Lost);
                            return Ok(());
                        }
                    }
                    Some(None) => {
                        error!("Lost MQTT connection. Attempting reconnect.");
                        self.apply(ConnectionEvent::Lost);
                        break;
                    }
                    None => {
                        warn!("mqtt message stream closed");
                        self.apply(ConnectionEvent::Lost);
                        return Ok(());
                    }
                }
            }

            time::sleep(self.reconnect_interval).await;
        }
    }

    async fn disconnect(&self) {
        if let Err(err) = self.client.disconnect(None).await {
            debug!("Error MQTT disconnecting: {}", err);
        }
    }
}
