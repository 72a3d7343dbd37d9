use crate::Metrics;
use anyhow::{Error as AnyhowError, Result};
use axum::{Router, routing::get, extract::State};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone, Debug)]
pub struct MetricsServerConfig {
    pub metrics_address: IpAddr,
    /// Zero lets the OS pick a free port.
    pub metrics_port: u16,
}

impl From<&MetricsServerConfig> for SocketAddr {
    fn from(config: &MetricsServerConfig) -> Self {
        SocketAddr::from((config.metrics_address, config.metrics_port))
    }
}

async fn prometheus_metrics_handler(State(metrics): State<Arc<Metrics>>) -> String {
    metrics.gather()
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics_handler))
        .route("/health", get(health_handler))
        .with_state(metrics)
}

pub async fn bind_metrics_listener(config: &MetricsServerConfig) -> Result<TcpListener> {
    let addr = SocketAddr::from(config);
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %listener.local_addr()?, "Metrics listener bound");
    Ok(listener)
}

/// Serves `/metrics` and `/health` on an already bound listener until
/// `shutdown` resolves.
pub async fn serve_metrics<F>(listener: TcpListener, metrics: Arc<Metrics>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(metrics).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AnyhowError::new)?;

    Ok(())
}
