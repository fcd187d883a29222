use clap::Parser;
use counter_arbiter::arbiter::types::PriorityMode;
use counter_arbiter::server::config::{
    DEFAULT_ADMISSION_TIMEOUT, DEFAULT_CAPACITY, DEFAULT_MAX_HOLD, DEFAULT_MIN_HOLD,
    DEFAULT_SHUTDOWN_GRACE, HoldTime, ServerConfig,
};
use counter_arbiter::server::handlers::router;
use counter_arbiter::server::service::CounterServer;
use counter_arbiter::storage::snapshot::DEFAULT_SNAPSHOT_FILE;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Counter server with reader/writer arbitration.
#[derive(Debug, Parser)]
#[command(name = "counter-arbiter-server", version)]
struct Args {
    /// TCP port for counter requests.
    #[arg(long)]
    port: u16,

    /// Which role is preferred when both are waiting (`reader` or `writer`).
    #[arg(long)]
    priority: PriorityMode,

    /// Consecutive admissions of the preferred role before the other role gets a turn.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    ratio: Option<u32>,

    /// Maximum number of requests handled at once.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// File holding the last counter value.
    #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
    snapshot: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MIN_HOLD.as_millis() as u64)]
    min_hold_ms: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_HOLD.as_millis() as u64)]
    max_hold_ms: u64,

    /// How long a new connection may wait for a free handler slot.
    #[arg(long, default_value_t = DEFAULT_ADMISSION_TIMEOUT.as_millis() as u64)]
    admission_timeout_ms: u64,

    /// How long in-flight requests get to finish on shutdown.
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_GRACE.as_millis() as u64)]
    grace_ms: u64,

    /// Address for the HTTP stats endpoints. Disabled when omitted.
    #[arg(long)]
    stats_addr: Option<SocketAddr>,

    /// Log filter, e.g. `info` or `counter_arbiter=debug`.
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log)?)
        .with_thread_names(true)
        .init();

    let config = ServerConfig {
        capacity: args.capacity,
        admission_timeout: Duration::from_millis(args.admission_timeout_ms),
        shutdown_grace: Duration::from_millis(args.grace_ms),
        hold_time: HoldTime::new(
            Duration::from_millis(args.min_hold_ms),
            Duration::from_millis(args.max_hold_ms),
        ),
        snapshot_path: Some(args.snapshot),
        ..ServerConfig::new(args.priority, args.ratio.unwrap_or(0))
    };

    tracing::info!(
        "Starting counter server: priority={}, ratio={}, capacity={}",
        config.arbiter.mode,
        config.arbiter.ratio,
        config.capacity
    );

    // 1. Shared state (recovers the counter from its snapshot):
    let server = CounterServer::new(config);

    // 2. Optional HTTP stats surface:
    if let Some(stats_addr) = args.stats_addr {
        let listener = tokio::net::TcpListener::bind(stats_addr).await?;
        let app = router(server.clone());
        tracing::info!("HTTP stats listening on {}", stats_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP stats server failed: {}", e);
            }
        });
    }

    // 3. Spawn stats reporter:
    let stats_server = server.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_INTERVAL);

        loop {
            interval.tick().await;
            let stats = stats_server.stats();
            tracing::info!(
                "Server stats: counter={} readers active={} waiting={}, writer active={} waiting={}",
                stats.counter,
                stats.arbiter.active_readers,
                stats.arbiter.waiting_readers,
                stats.arbiter.writer_active,
                stats.arbiter.waiting_writers
            );
            tracing::info!(
                "  - handlers: accepted={} reads={} writes={} failed={} in_flight={}/{} rejected={}",
                stats.handlers.accepted,
                stats.handlers.completed_reads,
                stats.handlers.completed_writes,
                stats.handlers.failed,
                stats.gate.in_flight,
                stats.gate.capacity,
                stats.gate.rejected
            );
        }
    });

    // 4. Accept counter requests until Ctrl+C:
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Press Ctrl+C to shutdown");

    server
        .run(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}
