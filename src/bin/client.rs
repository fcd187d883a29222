use clap::{Parser, ValueEnum};
use counter_arbiter::client::client::CounterClient;
use counter_arbiter::server::wire::Action;
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Reader,
    Writer,
}

impl Mode {
    fn action(self) -> Action {
        match self {
            Mode::Reader => Action::Read,
            Mode::Writer => Action::Write,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Mode::Reader => "Reader",
            Mode::Writer => "Writer",
        }
    }
}

/// Fires concurrent reader or writer requests at a counter server.
#[derive(Debug, Parser)]
#[command(name = "counter-arbiter-client", version)]
struct Args {
    #[arg(long)]
    ip: IpAddr,

    #[arg(long)]
    port: u16,

    #[arg(long, value_enum)]
    mode: Mode,

    /// Number of concurrent requests.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    threads: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let client = CounterClient::new(SocketAddr::new(args.ip, args.port));

    let results = client.run_batch(args.mode.action(), args.threads).await;

    let mut failed = 0usize;
    for (id, result) in results {
        match result {
            Ok(response) => println!(
                "[Client #{}] {}, counter={}, latency={} ns",
                id,
                args.mode.label(),
                response.counter,
                response.latency_ns
            ),
            Err(e) => {
                failed += 1;
                tracing::error!("[Client #{}] request failed: {:#}", id, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} requests failed", failed, args.threads);
    }
    Ok(())
}
