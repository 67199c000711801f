use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::engine::ApplicationEngine;

/// Drives the engine on a fixed cadence until `shutdown` broadcasts `true`.
///
/// The loop is run → sleep → run, not a fixed-rate timer: a sweep that
/// overruns its interval delays the next one instead of overlapping it,
/// which bounds remote-API load to one sweep's worth of traffic.
pub struct Sweeper {
    engine: Arc<ApplicationEngine>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(engine: Arc<ApplicationEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Run forever. An in-flight sweep abandoned at process shutdown is
    /// safe: the ledger's idempotent insert makes it resumable.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "sweeper started");
        loop {
            self.engine.run_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }
}
