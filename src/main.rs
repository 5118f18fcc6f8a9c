//! filedrop notification receiver.
//!
//! Main entry point. Loads configuration, opens the embedded datastore and
//! serves the Eventarc receiver until a shutdown signal arrives.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use filedrop_api::{AppState, Config};
use filedrop_core::{LogSink, RealClock, Storage};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting filedrop notification receiver");

    let database = config.database();
    let addr = config.parse_server_addr()?;
    info!(
        engine = %database.engine(),
        database_path = %database.path().display(),
        server_addr = %addr,
        eventarc_path = %config.eventarc_path,
        "Configuration loaded"
    );

    let storage = connect_with_retry(&config).await?;
    info!("Datastore opened");

    let clock = Arc::new(RealClock::new());
    let sink = Arc::new(LogSink::new());
    let state =
        AppState::new(storage.clone(), clock, sink).with_routes(config.to_route_options());

    if let Err(e) = filedrop_api::start_server(state, addr).await {
        error!(error = %e, "Server failed");
        storage.close().await;
        return Err(e).context("HTTP server failed");
    }

    storage.close().await;
    info!("Datastore closed");

    info!("filedrop shutdown complete");
    Ok(())
}

/// Initializes tracing, preferring `RUST_LOG` over the configured level.
fn init_tracing(configured: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{configured},filedrop=debug,tower_http=debug")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Opens the datastore, retrying while the volume holding it comes up.
async fn connect_with_retry(config: &Config) -> Result<Storage> {
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    let database = config.database();
    let settings = config.to_pool_settings();
    let mut retries = 0;

    loop {
        match Storage::connect(&database, &settings).await {
            Ok(storage) => {
                storage.health_check().await.context("Failed to verify datastore")?;
                return Ok(storage);
            },
            Err(e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    error = %e,
                    "Datastore connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to open datastore after retries");
            },
        }
    }
}
