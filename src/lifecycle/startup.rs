//! Startup orchestration.
//!
//! Order: first access-list load (synchronous, fatal on error), then the
//! HTTP server, then the background reloader. Traffic is only served once
//! the lists are in memory.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::reloader::spawn_reloader;
use crate::config::{ConfigError, ConfigStore, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("access list: {0}")]
    Config(#[from] ConfigError),

    #[error("upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// A started proxy and its background tasks.
pub struct Running {
    local_addr: SocketAddr,
    store: Arc<ConfigStore>,
    shutdown: Shutdown,
    server: JoinHandle<Result<(), std::io::Error>>,
    reloader: JoinHandle<()>,
}

impl Running {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Trigger shutdown and wait for the server and the reloader to finish.
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.trigger();
        self.wait().await
    }

    /// Wait for the server and the reloader to finish.
    pub async fn wait(self) -> Result<(), std::io::Error> {
        let served = self.server.await.map_err(std::io::Error::other)?;
        if let Err(e) = self.reloader.await {
            tracing::error!(error = %e, "Access list reloader panicked");
        }
        served
    }
}

/// Load the access list from `config.access.path` and start serving on
/// `listener`.
pub async fn start(config: ProxyConfig, listener: TcpListener) -> Result<Running, StartupError> {
    let store = Arc::new(ConfigStore::load(&config.access.path)?);
    start_with_store(config, listener, store).await
}

/// Start serving with an already-loaded store.
pub async fn start_with_store(
    config: ProxyConfig,
    listener: TcpListener,
    store: Arc<ConfigStore>,
) -> Result<Running, StartupError> {
    let local_addr = listener.local_addr()?;
    let shutdown = Shutdown::new();
    let reload_period = Duration::from_secs(config.access.reload_interval_secs);

    let server = HttpServer::new(config, store.clone())?;
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));
    let reloader = spawn_reloader(store.clone(), reload_period, shutdown.subscribe());

    Ok(Running {
        local_addr,
        store,
        shutdown,
        server,
        reloader,
    })
}
