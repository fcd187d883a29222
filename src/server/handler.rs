//! Request Handler
//!
//! Per-connection unit of work. The socket side (decode, reply) runs on the async
//! runtime; the arbitrated part runs on its own OS thread because `Arbitrator::enter`
//! blocks on a condition variable.

use super::config::HoldTime;
use super::gate::AdmissionPermit;
use super::protocol::HandlerCounts;
use super::wire::{self, Action, Request, Response, WireError};
use crate::arbiter::arbiter::Arbitrator;
use crate::storage::store::CounterStore;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::oneshot;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("transport failure: {0}")]
    Wire(#[from] WireError),
    #[error("could not start critical-section thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("critical-section thread ended without a response")]
    WorkerLost,
}

/// Totals across every handler of one server.
#[derive(Debug, Default)]
pub struct HandlerStats {
    accepted: AtomicU64,
    completed_reads: AtomicU64,
    completed_writes: AtomicU64,
    failed: AtomicU64,
}

impl HandlerStats {
    pub fn record_accept(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_success(&self, action: Action) {
        match action {
            Action::Read => self.completed_reads.fetch_add(1, Ordering::Relaxed),
            Action::Write => self.completed_writes.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HandlerCounts {
        HandlerCounts {
            accepted: self.accepted.load(Ordering::Relaxed),
            completed_reads: self.completed_reads.load(Ordering::Relaxed),
            completed_writes: self.completed_writes.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
pub struct RequestHandler {
    arbiter: Arc<Arbitrator>,
    store: Arc<CounterStore>,
    hold_time: HoldTime,
    stats: Arc<HandlerStats>,
}

impl RequestHandler {
    pub fn new(
        arbiter: Arc<Arbitrator>,
        store: Arc<CounterStore>,
        hold_time: HoldTime,
        stats: Arc<HandlerStats>,
    ) -> Self {
        Self {
            arbiter,
            store,
            hold_time,
            stats,
        }
    }

    /// Serves one connection end to end. `permit` is released when this returns, on
    /// success and on every error path.
    pub async fn handle<S>(
        &self,
        mut stream: S,
        permit: AdmissionPermit,
    ) -> Result<Response, HandlerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let _permit = permit;

        let result = self.serve(&mut stream).await;
        match &result {
            Ok(response) => self.stats.record_success(response.action),
            Err(_) => self.stats.record_failure(),
        }

        result
    }

    async fn serve<S>(&self, stream: &mut S) -> Result<Response, HandlerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Nothing touches the arbitrator until a whole frame has decoded
        let request = wire::read_request(stream).await?;
        let response = self.dispatch(request).await?;

        wire::write_response(stream, &response).await?;
        // The reply is already flushed; a failed FIN changes nothing for the peer.
        let _ = stream.shutdown().await;

        Ok(response)
    }

    /// Runs `request` through the critical section on a dedicated thread.
    pub async fn dispatch(&self, request: Request) -> Result<Response, HandlerError> {
        let (tx, rx) = oneshot::channel();
        let arbiter = self.arbiter.clone();
        let store = self.store.clone();
        let hold_time = self.hold_time;

        thread::Builder::new()
            .name(format!("{}-{}", request.action.role(), request.id))
            .spawn(move || {
                let response = execute(&arbiter, &store, hold_time, request);
                let _ = tx.send(response);
            })
            .map_err(HandlerError::Spawn)?;

        rx.await.map_err(|_| HandlerError::WorkerLost)
    }
}

/// Enter, operate on the counter, hold, exit. Blocks the calling thread.
///
/// The reported latency covers only the wait for admission, not the hold.
pub fn execute(
    arbiter: &Arbitrator,
    store: &CounterStore,
    hold_time: HoldTime,
    request: Request,
) -> Response {
    let started = Instant::now();
    let access = arbiter.access(request.action.role());
    let waited = started.elapsed();

    let counter = match request.action {
        Action::Write => {
            let value = store.write();
            tracing::info!("[WRITER #{}] counter updated to {}", request.id, value);
            value
        }
        Action::Read => {
            let value = store.read();
            tracing::info!("[READER #{}] counter read as {}", request.id, value);
            value
        }
    };

    hold_time.pause();
    drop(access);

    Response {
        action: request.action,
        counter,
        latency_ns: i64::try_from(waited.as_nanos()).unwrap_or(i64::MAX),
    }
}
