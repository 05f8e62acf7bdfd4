//! Run the payment gate over HTTP.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use path402_gate::{router, PaymentGate};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::context::NodeContext;
use crate::error::{CliError, CliResult};
use crate::metrics::{Metrics, SharedMetrics};
use crate::output::{OutputFormat, Render, ServeOutput};
use crate::signals::{shutdown_signal, wait_for};

/// Path of the Prometheus scrape endpoint.
pub const METRICS_PATH: &str = "/metrics";

#[derive(Clone)]
struct MetricsState {
    metrics: SharedMetrics,
    started: Instant,
}

/// Full node router: the gate plus `/metrics`.
pub fn app(gate: Arc<PaymentGate>, metrics: SharedMetrics) -> Router {
    let state = MetricsState {
        metrics,
        started: Instant::now(),
    };
    let metrics_routes = Router::new()
        .route(METRICS_PATH, get(scrape))
        .with_state(state);

    router(gate).merge(metrics_routes)
}

async fn scrape(State(state): State<MetricsState>) -> impl IntoResponse {
    state
        .metrics
        .uptime_seconds
        .set(state.started.elapsed().as_secs() as i64);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.encode(),
    )
}

/// Serve `ctx` on `listener` until `shutdown` resolves.
pub async fn run_server<F>(ctx: &NodeContext, listener: TcpListener, shutdown: F) -> CliResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics: SharedMetrics = Arc::new(Metrics::new());
    metrics
        .node_info
        .with_label_values(&[env!("CARGO_PKG_VERSION"), ctx.config.server.identity.as_str()])
        .set(1);

    let gate = Arc::new(ctx.build_gate(Some(metrics.clone()))?);
    let app = app(gate, metrics);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    Ok(())
}

/// Execute the serve command.
pub async fn serve(
    config: CliConfig,
    format: OutputFormat,
    listen: Option<String>,
) -> CliResult<String> {
    if config.paths.is_empty() {
        return Err(CliError::user(
            "No [[paths]] configured. Run 'path402 init' or add offerings to config.toml",
        ));
    }

    let listen_addr: SocketAddr = match listen {
        Some(addr) => addr
            .parse()
            .map_err(|e| CliError::config(format!("--listen {:?}: {}", addr, e)))?,
        None => config.server.listen_addr()?,
    };

    if let Some(rpm) = config.rate_limit.requests_per_minute {
        warn!(
            requests_per_minute = rpm,
            "rate_limit is accepted but not enforced"
        );
    }
    if config.server.pay_to.is_empty() {
        warn!("[server].pay_to is empty; challenges will not name a payee");
    }

    let ctx = NodeContext::open(config)?;
    let listener = TcpListener::bind(listen_addr).await?;
    let local_addr = listener.local_addr()?;

    let output = ServeOutput {
        listen: local_addr.to_string(),
        identity: ctx.config.server.identity.clone(),
        verification: format!("{:?}", ctx.config.verification.mode).to_lowercase(),
        paths: ctx.config.paths.iter().map(|p| p.path.clone()).collect(),
    };
    println!("{}", output.render(format));
    println!("\nPress Ctrl+C to stop the node...\n");

    info!(listen = %local_addr, paths = ctx.config.paths.len(), "path402 node listening");

    run_server(&ctx, listener, wait_for(shutdown_signal())).await?;

    info!("Shutting down");
    Ok("Node stopped gracefully.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_serve_requires_paths() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = CliConfig::example(temp_dir.path());
        config.paths.clear();
        let result = serve(config, OutputFormat::Human, None).await;
        assert!(matches!(result, Err(CliError::User(_))));
    }

    #[tokio::test]
    async fn test_serve_rejects_bad_listen() {
        let temp_dir = TempDir::new().unwrap();
        let config = CliConfig::example(temp_dir.path());
        let result = serve(config, OutputFormat::Human, Some("not-an-addr".into())).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
