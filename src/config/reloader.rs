//! Periodic access-list reload.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::store::ConfigStore;

/// Spawn the background task that reloads `store` every `period`.
///
/// The first tick fires one full period after start; the initial load is
/// the caller's job. Reload errors are logged by the store and absorbed.
pub fn spawn_reloader(
    store: Arc<ConfigStore>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(path = ?store.path(), period = ?period, "Access list reloader started");

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let store = store.clone();
                    // File IO stays off the async workers.
                    if let Err(e) = tokio::task::spawn_blocking(move || store.reload()).await {
                        tracing::error!(error = %e, "Access list reload task failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Access list reloader received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}
