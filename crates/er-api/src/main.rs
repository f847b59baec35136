use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{error, info};

use er_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use er_common::run_id;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing_subscriber("er-api");
    install_tracing_panic_hook("er-api");

    let config = er_api::AppConfig::from_env();
    let port = config.port;

    er_metrics::init_metrics("ER_METRICS_PORT", 9302);

    // Startup is all-or-nothing: a missing or mismatched model artifact
    // must stop the process before the listener binds.
    let state = match er_api::load_state(config) {
        Ok(state) => state,
        Err(err) => {
            error!(error = %err, run_id = run_id::get(), "failed to load serving state");
            std::process::exit(1);
        }
    };

    let router = er_api::create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(%addr, run_id = run_id::get(), "er-api listening");
    if let Err(err) = axum::serve(listener, router).await {
        error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}
