//! Connection Acceptor
//!
//! Accepts TCP connections, reserves an admission slot for each one and hands it to a
//! `RequestHandler` task. Handler tasks live in a `JoinSet` so shutdown can wait for them.
//!
//! ## Shutdown
//! When the shutdown future resolves the acceptor stops accepting, closes the admission
//! gate, wakes every arbitration waiter and gives in-flight handlers a grace period to
//! finish. Handlers still running after that are detached, not aborted.

use super::config::ServerConfig;
use super::gate::{AdmissionError, AdmissionGate};
use super::handler::{HandlerStats, RequestHandler};
use super::protocol::{GateStats, StatsResponse};
use crate::arbiter::arbiter::Arbitrator;
use crate::storage::store::CounterStore;

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinSet};

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub struct CounterServer {
    config: ServerConfig,
    arbiter: Arc<Arbitrator>,
    store: Arc<CounterStore>,
    gate: AdmissionGate,
    stats: Arc<HandlerStats>,
}

impl CounterServer {
    /// Creates a server, recovering the counter from `config.snapshot_path` if set.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let store = match &config.snapshot_path {
            Some(path) => CounterStore::open(path),
            None => CounterStore::in_memory(0),
        };
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: ServerConfig, store: Arc<CounterStore>) -> Arc<Self> {
        Arc::new(Self {
            arbiter: Arc::new(Arbitrator::new(config.arbiter)),
            gate: AdmissionGate::new(config.capacity),
            stats: Arc::new(HandlerStats::default()),
            store,
            config,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn arbiter(&self) -> &Arc<Arbitrator> {
        &self.arbiter
    }

    pub fn store(&self) -> &Arc<CounterStore> {
        &self.store
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn handler(&self) -> RequestHandler {
        RequestHandler::new(
            self.arbiter.clone(),
            self.store.clone(),
            self.config.hold_time,
            self.stats.clone(),
        )
    }

    pub fn stats(&self) -> StatsResponse {
        StatsResponse {
            counter: self.store.read(),
            arbiter: self.arbiter.snapshot(),
            gate: GateStats {
                capacity: self.gate.capacity(),
                in_flight: self.gate.in_flight(),
                peak_in_flight: self.gate.peak_in_flight(),
                rejected: self.gate.rejected_total(),
            },
            handlers: self.stats.snapshot(),
        }
    }

    /// Accepts connections on `listener` until `shutdown` resolves, then drains.
    pub async fn run<F>(self: Arc<Self>, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            "Counter server listening on {} (priority={}, ratio={}, capacity={})",
            listener.local_addr()?,
            self.config.arbiter.mode,
            self.config.arbiter.ratio,
            self.config.capacity
        );

        let mut handlers = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                Some(joined) = handlers.join_next() => {
                    Self::reap(joined);
                    continue;
                }
                accepted = listener.accept() => match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                },
            };

            self.stats.record_accept();
            tracing::debug!("Accepted connection from {}", peer);

            let permit = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested while waiting for a handler slot");
                    break;
                }
                acquired = self.gate.acquire(self.config.admission_timeout) => match acquired {
                    Ok(permit) => permit,
                    Err(AdmissionError::Timeout(waited)) => {
                        tracing::warn!(
                            "Dropping connection from {}: no handler slot within {:?}",
                            peer,
                            waited
                        );
                        continue;
                    }
                    Err(AdmissionError::Closed) => break,
                },
            };

            let handler = self.handler();
            handlers.spawn(async move {
                match handler.handle(stream, permit).await {
                    Ok(response) => tracing::debug!("Served {:?} for {}", response, peer),
                    Err(e) => tracing::warn!("Connection from {} aborted: {}", peer, e),
                }
            });
        }

        drop(listener);
        self.begin_shutdown();
        self.drain(handlers).await;

        tracing::info!("Counter server stopped");
        Ok(())
    }

    /// Closes the admission gate and wakes every parked request so it can re-check its
    /// condition.
    pub fn begin_shutdown(&self) {
        self.gate.close();
        self.arbiter.wake_all();
    }

    async fn drain(&self, mut handlers: JoinSet<()>) {
        if handlers.is_empty() {
            return;
        }

        let grace = self.config.shutdown_grace;
        tracing::info!(
            "Waiting up to {:?} for {} in-flight handlers",
            grace,
            handlers.len()
        );

        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = handlers.join_next().await {
                Self::reap(joined);
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                "{} handlers still running after {:?}, leaving them to finish on their own",
                handlers.len(),
                grace
            );
            handlers.detach_all();
        }
    }

    fn reap(joined: Result<(), JoinError>) {
        if let Err(e) = joined {
            tracing::error!("Handler task failed: {}", e);
        }
    }
}
