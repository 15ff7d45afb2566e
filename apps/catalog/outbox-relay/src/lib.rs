//! Catalog outbox relay.
//!
//! The write path records price-changed events durably and attempts dispatch
//! once; anything that stays `pending` (bus outage, crash between commit and
//! dispatch) is picked up here. Each sweep loads the oldest pending rows,
//! publishes them to the catalog stream, and marks them published. Rows that
//! fail again are retried on the next sweep. Delivery is at-least-once and
//! consumers dedup by event id, so no retry counter is kept.

use std::sync::Arc;
use std::time::Duration;

use core_config::database::DatabaseConfig;
use core_config::redis::RedisConfig;
use core_config::{env_parse_or_default, ConfigError, Environment, FromEnv};
use database::common::RetryConfig;
use domain_catalog::{EventDispatcher, PgEventLogRepository, RedisIntegrationEventPublisher};
use event_bus::{CatalogEventStream, StreamProducer};
use eyre::WrapErr;
use tokio::sync::watch;
use tracing::{error, info};

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// How often to sweep the outbox for pending rows, in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum rows re-driven per sweep.
    pub batch_size: u64,
}

impl FromEnv for RelayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            poll_interval_ms: env_parse_or_default("RELAY_POLL_INTERVAL_MS", 5000)?,
            batch_size: env_parse_or_default("RELAY_BATCH_SIZE", 50)?,
        })
    }
}

pub async fn run() -> eyre::Result<()> {
    core_config::tracing::install_color_eyre();
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let relay_config = RelayConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let redis_config = RedisConfig::from_env()?;

    let retry = RetryConfig::new().with_max_retries(5).with_initial_delay(500);
    let db = database::postgres::connect_with_retry(&db_config.url, Some(retry.clone()))
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;
    database::postgres::check_health(&db)
        .await
        .wrap_err("PostgreSQL health check failed")?;

    let redis = database::redis::connect_with_retry(&redis_config.url, Some(retry))
        .await
        .wrap_err("Failed to connect to Redis")?;

    let producer = StreamProducer::from_stream_def::<CatalogEventStream>(redis);
    let dispatcher = EventDispatcher::new(
        Arc::new(RedisIntegrationEventPublisher::new(producer)),
        Arc::new(PgEventLogRepository::new(db)),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received ctrl-c, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    run_sweep_loop(dispatcher, relay_config, shutdown_rx).await;
    Ok(())
}

async fn run_sweep_loop(
    dispatcher: EventDispatcher,
    config: RelayConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        poll_interval_ms = config.poll_interval_ms,
        batch_size = config.batch_size,
        "Starting outbox relay"
    );

    let poll_interval = Duration::from_millis(config.poll_interval_ms);

    loop {
        if *shutdown.borrow() {
            break;
        }

        match dispatcher.redrive_pending(config.batch_size).await {
            Ok(0) => {}
            Ok(published) => {
                info!(published, "Re-published pending integration events");
            }
            Err(e) => {
                error!(error = %e, "Outbox sweep failed");
            }
        }

        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    info!("Outbox relay stopped");
}
