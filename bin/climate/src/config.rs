use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use transport::{ConnectionOptions, Subscription};

use crate::Error;

#[derive(Clone, Debug)]
pub struct Config {
    pub mqtt: ConnectionOptions,
    pub subscription: Subscription,
    pub http_address: SocketAddr,
    pub firmware_dir: PathBuf,
    pub history_capacity: usize,
    pub heartbeat_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, Error> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let required = |key: &str| {
            var(key).ok_or_else(|| Error::Config(format!("set ENV variable {key}")))
        };

        fn parse<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, Error> {
            match value {
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("{key} has an invalid value {value:?}"))),
                None => Ok(default),
            }
        }

        let mut subscription = Subscription::new(required("MQTT_TOPIC")?);
        if let Some(diagnostic) = var("MQTT_DIAGNOSTIC_TOPIC") {
            subscription = subscription.with_diagnostic(diagnostic);
        }

        let mqtt = ConnectionOptions {
            address: required("MQTT_ADDRESS")?,
            client_id: var("MQTT_CLIENT_ID")
                .unwrap_or_else(|| format!("climate-{}", uuid::Uuid::new_v4())),
            username: required("MQTT_USER")?,
            password: required("MQTT_PASS")?,
            verify_certificate: parse("MQTT_VERIFY_CERT", var("MQTT_VERIFY_CERT"), true)?,
            reconnect_interval: Duration::from_secs(parse(
                "MQTT_RECONNECT_SECS",
                var("MQTT_RECONNECT_SECS"),
                5,
            )?),
        };

        let host: IpAddr = parse(
            "HTTP_ADDRESS",
            var("HTTP_ADDRESS"),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        )?;
        let port: u16 = parse("PORT", var("PORT"), 3000)?;

        let history_capacity = parse(
            "HISTORY_CAPACITY",
            var("HISTORY_CAPACITY"),
            telemetry::DEFAULT_CAPACITY,
        )?;
        if history_capacity == 0 {
            return Err(Error::Config("HISTORY_CAPACITY must be at least 1".to_string()));
        }

        let heartbeat_secs: u64 = parse(
            "HEARTBEAT_INTERVAL_SECS",
            var("HEARTBEAT_INTERVAL_SECS"),
            30,
        )?;
        if heartbeat_secs == 0 {
            return Err(Error::Config(
                "HEARTBEAT_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            mqtt,
            subscription,
            http_address: SocketAddr::new(host, port),
            firmware_dir: var("FIRMWARE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            history_capacity,
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
        })
    }
}
