use climate::{heartbeat, ingest_worker, router, AppState, Config, Result, VERSION};
use firmware::FirmwareRegistry;
use telemetry::IngestService;
use transport::Connection;

use std::sync::Arc;
use std::time::Instant;

use log::{error, info};
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_timed();

    info!("climate version {VERSION}");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return Err(err.into());
        }
    };

    let ingest = Arc::new(IngestService::new(config.history_capacity));
    let registry = Arc::new(FirmwareRegistry::new(&config.firmware_dir));

    info!(
        "keeping the last {} readings, firmware in {} (max {} bytes)",
        ingest.capacity(),
        registry.directory().display(),
        registry.max_size()
    );

    let connection = Connection::new(config.mqtt.clone(), config.subscription.clone())?;
    let connection_state = connection.state();

    let (tx, rx) = mpsc::unbounded_channel();

    let state = AppState {
        ingest: ingest.clone(),
        registry,
        connection: connection_state.clone(),
        started_at: Instant::now(),
    };

    let listener = TcpListener::bind(config.http_address).await?;
    info!("Listening http://{}", config.http_address);

    let web_handle = task::spawn(async move { axum::serve(listener, router(state)).await });
    let mqtt_handle = task::spawn(connection.run(tx));
    let ingest_handle = task::spawn(ingest_worker(rx, ingest.clone()));
    let heartbeat_handle = task::spawn(heartbeat(
        ingest,
        connection_state,
        config.heartbeat_interval,
    ));

    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = web_handle => match result {
            Ok(Ok(())) => info!("http server stopped"),
            Ok(Err(err)) => error!("http server failed: {err}"),
            Err(err) => error!("http server task failed: {err}"),
        },
        result = mqtt_handle => match result {
            Ok(Ok(())) => info!("mqtt connection stopped"),
            Ok(Err(err)) => error!("mqtt connection failed: {err}"),
            Err(err) => error!("mqtt task failed: {err}"),
        },
        result = ingest_handle => if let Err(err) = result {
            error!("ingest worker failed: {err}");
        },
        result = heartbeat_handle => if let Err(err) = result {
            error!("heartbeat failed: {err}");
        },
        _ = sigterm.recv() => info!("got SIGTERM, exiting..."),
        _ = tokio::signal::ctrl_c() => info!("got SIGINT, exiting..."),
    };

    Ok(())
}
