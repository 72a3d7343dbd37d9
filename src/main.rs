use anyhow::{Context, Result};
use clap::Parser;
use metrics::server::{bind_metrics_listener, serve_metrics, MetricsServerConfig};
use metrics::Metrics;
use runner::{NodeStartup, ReadyReport};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Live Eden node serving a chain state built by the governance harness.
#[derive(Parser, Debug)]
struct Args {
    /// Startup file written by the harness
    #[arg(short, long)]
    state: PathBuf,

    /// Where to write the ready report once serving
    #[arg(short, long)]
    ready_file: PathBuf,

    #[arg(short, long, default_value = "127.0.0.1")]
    address: IpAddr,

    #[arg(short, long, default_value_t = 0)]
    metrics_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let started = Instant::now();
    let args = Args::parse();

    let startup = NodeStartup::load(&args.state)
        .with_context(|| format!("failed to load startup state from {:?}", args.state))?;
    startup.verify().context("startup state failed verification")?;

    info!(
        name = %startup.name,
        sequence = startup.chain.sequence().0,
        members = startup.chain.member_count(),
        elections = startup.chain.elections().len(),
        root = %startup.state_root,
        "Loaded chain state"
    );

    let metrics = Arc::new(Metrics::new());
    metrics.observe_chain(&startup.chain);

    let listener = bind_metrics_listener(&MetricsServerConfig {
        metrics_address: args.address,
        metrics_port: args.metrics_port,
    })
    .await
    .context("failed to bind metrics listener")?;
    let metrics_address = listener.local_addr()?;

    metrics.set_ready(true);
    metrics.observe_startup_time(started.elapsed().as_secs_f64());

    ReadyReport::new(std::process::id(), &startup, metrics_address)
        .save(&args.ready_file)
        .with_context(|| format!("failed to write ready report to {:?}", args.ready_file))?;

    info!(metrics = %metrics_address, "Node ready");

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };
    serve_metrics(listener, metrics, shutdown).await?;

    info!("Node stopped");
    Ok(())
}
