use clap::Parser;
use dotenvy::dotenv;
use thiserror::Error;
use tracing::{error, info, warn};

use er_common::artifact::{save_artifact, ArtifactError, ModelArtifact};
use er_common::dataset::{assemble_dataset, drop_groups_without_positive, pivot_executives};
use er_common::eval::{precision_at_k, EvalError};
use er_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use er_common::metric_log::{append_metric, MetricLogEntry, MetricLogError};
use er_common::ranker::{create_ranker, load_config_from_env, RankerError};
use er_common::run_id;
use er_common::split::{split_by_group, SplitConfig, SplitError};
use er_common::tables::{load_exec_attributes, load_matches, load_opportunities, TableError};

/// Offline training job: reads the three raw tables fresh, assembles the
/// pairwise dataset, fits the ranker on a grouped split, evaluates
/// Precision@K on the held-out groups, and persists the model artifact plus
/// one metric log row. Runs sequentially and fails fast.
#[derive(Debug, Clone, Parser)]
#[command(name = "er-trainer", about = "Offline training job for the executive ranker")]
struct Cli {
    /// Long-form executive attribute table (CSV)
    #[arg(long, env = "ER_EXEC_ROLES_PATH", default_value = "exec_roles.csv")]
    exec_roles_path: String,

    /// Opportunity table (CSV)
    #[arg(long, env = "ER_OPP_PATH", default_value = "opp.csv")]
    opp_path: String,

    /// Historical match table (CSV)
    #[arg(long, env = "ER_MATCH_PATH", default_value = "match.csv")]
    match_path: String,

    /// Where to write the model artifact
    #[arg(long, env = "ER_MODEL_PATH", default_value = "models/ranker.json")]
    model_path: String,

    /// Append-only Precision@K log
    #[arg(long, env = "ER_METRIC_LOG_PATH", default_value = "logs/precision_log.csv")]
    metric_log_path: String,

    /// Evaluation cutoff K
    #[arg(long, env = "ER_PRECISION_K", default_value_t = 5)]
    precision_k: usize,

    /// Ranking algorithm: pairwise_logistic | uniform
    #[arg(long, env = "ER_RANKER", default_value = "pairwise_logistic")]
    ranker: String,
}

#[derive(Debug, Error)]
enum TrainerError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Ranker(#[from] RankerError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    MetricLog(#[from] MetricLogError),
    #[error("no training rows survived assembly")]
    EmptyDataset,
}

fn main() {
    dotenv().ok();
    init_tracing_subscriber("er-trainer");
    install_tracing_panic_hook("er-trainer");

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        error!(error = %err, run_id = run_id::get(), "training run failed");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), TrainerError> {
    let run_id = run_id::get();
    info!(run_id, ranker = cli.ranker, "starting training run");

    let attributes = load_exec_attributes(&cli.exec_roles_path)?;
    let opportunities = load_opportunities(&cli.opp_path)?;
    let matches = load_matches(&cli.match_path)?;

    let executives = pivot_executives(&attributes);
    info!(executives = executives.len(), "pivoted executive table");

    let (rows, mut report) = assemble_dataset(&matches, &opportunities, &executives);
    let rows = drop_groups_without_positive(rows, &mut report);

    for (reason, count) in &report.rows_skipped {
        warn!(reason = %reason, count, "rows skipped during assembly");
    }
    info!(
        rows_kept = report.rows_kept,
        rows_skipped = report.rows_skipped_total(),
        groups_dropped_without_positive = report.groups_dropped_without_positive,
        "assembled dataset"
    );

    if rows.is_empty() {
        return Err(TrainerError::EmptyDataset);
    }

    let (train, test) = split_by_group(&rows, &SplitConfig::from_env())?;

    let train_features: Vec<_> = train.rows.iter().map(|row| row.features).collect();
    let train_labels: Vec<_> = train.rows.iter().map(|row| row.label).collect();

    let mut ranker = create_ranker(&cli.ranker, load_config_from_env());
    ranker.fit(&train_features, &train_labels, &train.group_sizes)?;
    info!(
        algorithm = ranker.name(),
        algorithm_version = ranker.version(),
        train_rows = train.rows.len(),
        train_groups = train.group_count(),
        "fitted ranker"
    );

    let test_features: Vec<_> = test.rows.iter().map(|row| row.features).collect();
    let scores = ranker.score(&test_features);
    let precision = precision_at_k(&test.rows, &scores, &test.group_sizes, cli.precision_k)?;
    info!(
        k = cli.precision_k,
        precision,
        test_groups = test.group_count(),
        "evaluated held-out groups"
    );

    let artifact = ModelArtifact::from_ranker(ranker.as_ref(), run_id);
    save_artifact(&cli.model_path, &artifact)?;
    append_metric(&cli.metric_log_path, &MetricLogEntry::new(precision))?;

    info!(run_id, model_path = cli.model_path, "training run complete");
    Ok(())
}
