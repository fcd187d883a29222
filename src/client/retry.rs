use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;

/// Delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(150);
/// Backoff doubles until it reaches this cap.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(1200);
pub const DEFAULT_ATTEMPTS: usize = 5;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

const MAX_JITTER_MS: u64 = 50;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not connect to {addr} after {attempts} attempts: {source}")]
    Exhausted {
        addr: SocketAddr,
        attempts: usize,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total connection attempts, including the first. Zero is treated as one.
    pub attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Bound on a single connection attempt.
    pub connect_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the failed attempt number `attempt` (zero-based), without jitter.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 0..attempt {
            delay = (delay * 2).min(self.max_delay);
        }
        delay.min(self.max_delay)
    }
}

/// Connects to `addr`, retrying refused or timed-out attempts with exponential backoff.
pub async fn connect_with_retry(
    addr: SocketAddr,
    policy: &RetryPolicy,
) -> Result<TcpStream, ConnectError> {
    let attempts = policy.attempts.max(1);
    let mut last_error = io::Error::other("no connection attempt made");

    for attempt in 0..attempts {
        let outcome = tokio::time::timeout(policy.connect_timeout, TcpStream::connect(addr))
            .await
            .unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "connection attempt timed out",
                ))
            });

        match outcome {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!(
                    "Connect attempt {}/{} to {} failed: {}",
                    attempt + 1,
                    attempts,
                    addr,
                    e
                );
                last_error = e;

                if attempt + 1 == attempts {
                    break;
                }
                // Simple jitter to prevent thundering herd
                let jitter = rand::random::<u64>() % MAX_JITTER_MS;
                tokio::time::sleep(policy.backoff(attempt) + Duration::from_millis(jitter)).await;
            }
        }
    }

    Err(ConnectError::Exhausted {
        addr,
        attempts,
        source: last_error,
    })
}
