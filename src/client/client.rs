use super::retry::{RetryPolicy, connect_with_retry};
use crate::server::wire::{self, Action, Request, Response};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct CounterClient {
    addr: SocketAddr,
    retry: RetryPolicy,
}

impl CounterClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self::with_retry(addr, RetryPolicy::default())
    }

    pub fn with_retry(addr: SocketAddr, retry: RetryPolicy) -> Self {
        Self { addr, retry }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Opens a connection, sends `request` and waits for its response.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let mut stream = connect_with_retry(self.addr, &self.retry).await?;

        wire::write_request(&mut stream, &request)
            .await
            .with_context(|| format!("sending request #{} to {}", request.id, self.addr))?;
        let response = wire::read_response(&mut stream)
            .await
            .with_context(|| format!("reading response #{} from {}", request.id, self.addr))?;

        Ok(response)
    }

    /// Issues `count` concurrent requests of one kind, ids `0..count`.
    ///
    /// Results come back indexed by request id; one failed request does not cancel the others.
    pub async fn run_batch(&self, action: Action, count: u32) -> Vec<(u32, Result<Response>)> {
        let mut requests = JoinSet::new();
        for id in 0..count {
            let client = self.clone();
            requests.spawn(async move { (id, client.send(Request::new(action, id)).await) });
        }

        let mut results = Vec::with_capacity(count as usize);
        while let Some(joined) = requests.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Client task failed: {}", e),
            }
        }

        results.sort_by_key(|(id, _)| *id);
        results
    }
}
