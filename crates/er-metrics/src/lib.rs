use std::env;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Start a Prometheus exporter on `0.0.0.0:<port>`, resolving the port from
/// the named environment variable with a fallback. Idempotent: repeat calls
/// after a successful install are no-ops. Exporter failure is logged and
/// never fatal.
pub fn init_metrics(port_env: &str, default_port: u16) {
    if PROMETHEUS_HANDLE.get().is_some() {
        return;
    }

    let port = env::var(port_env)
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(default_port);

    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install_recorder()
    {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
            info!(metrics_port = port, "started prometheus exporter");
        }
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to start prometheus exporter");
        }
    }
}

/// Record one serving-time ranking request and how many candidates it
/// scored and returned.
pub fn record_rank_request(pool_size: usize, returned: usize) {
    metrics::counter!("er_rank_requests_total").increment(1);
    metrics::histogram!("er_rank_candidate_pool_size").record(pool_size as f64);
    metrics::histogram!("er_rank_returned").record(returned as f64);
}
