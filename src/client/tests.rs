//! Client Module Tests
//!
//! ## Test Scopes
//! - **Retry**: Backoff schedule and exhaustion against a closed port.
//! - **Requests**: Single requests and batches against a running server.

#[cfg(test)]
mod tests {
    use crate::arbiter::types::PriorityMode;
    use crate::client::client::CounterClient;
    use crate::client::retry::{ConnectError, RetryPolicy, connect_with_retry};
    use crate::server::config::{HoldTime, ServerConfig};
    use crate::server::service::CounterServer;
    use crate::server::wire::{Action, Request};

    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    fn quick_retry(attempts: usize) -> RetryPolicy {
        RetryPolicy {
            attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            connect_timeout: Duration::from_millis(500),
        }
    }

    /// An address nothing is listening on.
    async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    async fn start_server(
        mode: PriorityMode,
    ) -> (Arc<CounterServer>, SocketAddr, oneshot::Sender<()>, JoinHandle<anyhow::Result<()>>) {
        let config = ServerConfig {
            hold_time: HoldTime::none(),
            snapshot_path: None,
            ..ServerConfig::new(mode, 0)
        };
        let server = CounterServer::new(config);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(server.clone().run(listener, async move {
            let _ = stop_rx.await;
        }));

        (server, addr, stop_tx, task)
    }

    // ==========================================
    // RETRY
    // ==========================================

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(0), Duration::from_millis(150));
        assert_eq!(policy.backoff(1), Duration::from_millis(300));
        assert_eq!(policy.backoff(2), Duration::from_millis(600));
        assert_eq!(policy.backoff(3), Duration::from_millis(1200));
        assert_eq!(policy.backoff(10), Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_retry_exhausts_against_closed_port() {
        // ARRANGE
        let addr = closed_port().await;
        let policy = quick_retry(3);

        // ACT
        let started = Instant::now();
        let result = connect_with_retry(addr, &policy).await;

        // ASSERT
        match result {
            Err(ConnectError::Exhausted {
                addr: failed,
                attempts,
                ..
            }) => {
                assert_eq!(failed, addr);
                assert_eq!(attempts, 3);
            }
            Ok(_) => panic!("nothing listens on {}", addr),
        }
        // Two sleeps of at least 10ms and 20ms between the three attempts
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let addr = closed_port().await;

        let result = connect_with_retry(addr, &quick_retry(0)).await;
        assert!(matches!(
            result,
            Err(ConnectError::Exhausted { attempts: 1, .. })
        ));
    }

    // ==========================================
    // REQUESTS
    // ==========================================

    #[tokio::test]
    async fn test_send_round_trip() {
        let (server, addr, stop, task) = start_server(PriorityMode::ReaderPriority).await;
        let client = CounterClient::with_retry(addr, quick_retry(3));

        let written = client.send(Request::new(Action::Write, 1)).await.unwrap();
        let read = client.send(Request::new(Action::Read, 2)).await.unwrap();

        assert_eq!(written.counter, 1);
        assert_eq!(read.action, Action::Read);
        assert_eq!(read.counter, 1);

        stop.send(()).unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(server.store().read(), 1);
    }

    #[tokio::test]
    async fn test_batch_of_writers() {
        let (server, addr, stop, task) = start_server(PriorityMode::WriterPriority).await;
        let client = CounterClient::with_retry(addr, quick_retry(3));

        let results = client.run_batch(Action::Write, 10).await;

        assert_eq!(results.len(), 10);
        let ids: Vec<u32> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<u32>>());

        let mut counters: Vec<u32> = results
            .into_iter()
            .map(|(_, result)| result.unwrap().counter)
            .collect();
        counters.sort_unstable();
        assert_eq!(counters, (1..=10).collect::<Vec<u32>>());

        stop.send(()).unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(server.store().read(), 10);
    }

    #[tokio::test]
    async fn test_send_fails_when_server_is_gone() {
        let addr = closed_port().await;
        let client = CounterClient::with_retry(addr, quick_retry(2));

        let result = client.send(Request::new(Action::Read, 0)).await;

        let error = result.unwrap_err();
        assert!(error.downcast_ref::<ConnectError>().is_some());
    }
}
