use std::sync::Arc;

use axum::{
    http::header::CONTENT_TYPE,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use er_common::artifact::{load_ranker, ModelArtifact};
use er_common::dataset::pivot_executives;
use er_common::ranker::RelevanceRanker;
use er_common::tables::load_exec_attributes;
use er_common::Executive;

pub mod error;
pub mod handlers;

use error::ApiError;
use handlers::{health, rank};

#[derive(Debug, Clone, Parser)]
#[command(name = "er-api", about = "HTTP serving layer for the executive ranker")]
struct Cli {
    /// Model artifact written by the training job
    #[arg(long, env = "ER_MODEL_PATH", default_value = "models/ranker.json")]
    model_path: String,

    /// Long-form executive attribute table (CSV)
    #[arg(long, env = "ER_EXEC_ROLES_PATH", default_value = "exec_roles.csv")]
    exec_roles_path: String,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = 3002)]
    port: u16,

    /// Default result count when a request does not set `limit`
    #[arg(long, env = "ER_TOP_N", default_value_t = 10)]
    top_n: usize,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "ER_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: String,
    pub exec_roles_path: String,
    pub port: u16,
    pub top_n: usize,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    fn from_cli(cli: Cli) -> Self {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            model_path: cli.model_path,
            exec_roles_path: cli.exec_roles_path,
            port: cli.port,
            top_n: cli.top_n,
            cors_origins,
        }
    }

    pub fn from_env() -> Self {
        Self::from_cli(Cli::parse())
    }
}

/// Process-wide read-only serving state: the model and the pivoted
/// executive table, loaded once at startup and shared across requests
/// without locks. Requests never mutate it.
pub struct AppState {
    pub config: AppConfig,
    pub artifact: ModelArtifact,
    pub ranker: Box<dyn RelevanceRanker>,
    pub executives: Vec<Executive>,
}

pub type SharedState = Arc<AppState>;

/// Load everything serving needs. Any failure here is fatal: the caller
/// must not bind the listener on an error.
pub fn load_state(config: AppConfig) -> Result<SharedState, ApiError> {
    let (artifact, ranker) = load_ranker(&config.model_path)?;
    let attributes = load_exec_attributes(&config.exec_roles_path)?;
    let executives = pivot_executives(&attributes);

    info!(
        model_version = artifact.model_version,
        algorithm = artifact.algorithm,
        executives = executives.len(),
        "serving state loaded"
    );

    Ok(Arc::new(AppState {
        config,
        artifact,
        ranker,
        executives,
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .route("/api/rank", post(rank::rank))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serving state over a uniform model and a two-executive pool, for router
/// tests.
pub fn test_state() -> SharedState {
    use er_common::ranker::UniformRanker;

    let ranker = UniformRanker::new();
    let artifact = ModelArtifact::from_ranker(&ranker, "01TEST");

    let executives = vec![
        Executive {
            exec_id: Some(1),
            sectors: Some(r#"["health"]"#.into()),
            sub_sectors: None,
            industry: None,
            hq_country: Some("UK".into()),
            scale: Some("large".into()),
        },
        Executive {
            exec_id: Some(2),
            sectors: Some(r#"["retail"]"#.into()),
            sub_sectors: None,
            industry: None,
            hq_country: Some("US".into()),
            scale: Some("small".into()),
        },
    ];

    Arc::new(AppState {
        config: AppConfig {
            model_path: "models/ranker.json".into(),
            exec_roles_path: "exec_roles.csv".into(),
            port: 0,
            top_n: 10,
            cors_origins: vec!["http://localhost:3000".into()],
        },
        artifact,
        ranker: Box::new(ranker),
        executives,
    })
}
