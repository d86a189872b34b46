use mongodb::{Client, Database};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::connector::{connect_from_config, connect_from_config_with_retry};
use super::{MongoConfig, health::ping};
use crate::DatabaseResult;
use crate::common::RetryConfig;

/// Shared connection to the document store.
///
/// Owns the driver client, the application database and a readiness flag.
/// A background task pings the server every `health_interval_secs` and flips
/// the flag on failure or recovery, so request paths can check readiness
/// without a round trip. Clones share the same flag and monitor.
#[derive(Clone, Debug)]
pub struct MongoHandle {
    client: Client,
    database: Database,
    ready: Arc<AtomicBool>,
    monitor: AbortHandle,
}

impl MongoHandle {
    /// Connect, verify with a ping and start the readiness monitor.
    pub async fn connect(config: &MongoConfig) -> DatabaseResult<Self> {
        let client = connect_from_config(config).await?;
        Ok(Self::start(client, config.database(), config.health_interval()))
    }

    /// [`MongoHandle::connect`] with exponential backoff between attempts.
    pub async fn connect_with_retry(
        config: &MongoConfig,
        retry_config: Option<RetryConfig>,
    ) -> DatabaseResult<Self> {
        let client = connect_from_config_with_retry(config, retry_config).await?;
        Ok(Self::start(client, config.database(), config.health_interval()))
    }

    /// Wrap an already verified client. Must be called inside a tokio runtime.
    pub fn start(client: Client, database: &str, interval: Duration) -> Self {
        let ready = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(monitor(client.clone(), ready.clone(), interval));

        Self {
            database: client.database(database),
            client,
            ready,
            monitor: task.abort_handle(),
        }
    }

    /// Last known reachability of the server.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Ping now and record the outcome in the readiness flag.
    pub async fn ping(&self) -> bool {
        let healthy = ping(&self.client).await.is_ok();
        record(&self.ready, healthy);
        healthy
    }

    /// Stop the monitor and close every pooled connection.
    pub async fn shutdown(self) {
        self.monitor.abort();
        self.ready.store(false, Ordering::SeqCst);
        self.client.shutdown().await;
        info!("MongoDB connection closed");
    }
}

async fn monitor(client: Client, ready: Arc<AtomicBool>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately and the connection was just verified
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let healthy = matches!(
            tokio::time::timeout(interval, ping(&client)).await,
            Ok(Ok(()))
        );
        record(&ready, healthy);
    }
}

fn record(ready: &AtomicBool, healthy: bool) {
    let was_ready = ready.swap(healthy, Ordering::SeqCst);
    match (was_ready, healthy) {
        (true, false) => warn!("MongoDB connection lost"),
        (false, true) => info!("MongoDB connection restored"),
        _ => {}
    }
}
