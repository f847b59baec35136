pub mod pairwise;
pub mod uniform;

pub use pairwise::PairwiseLogisticRanker;
pub use uniform::UniformRanker;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::features::FeatureVector;

#[derive(Debug, Error)]
pub enum RankerError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error(
        "training shapes disagree: {feature_rows} feature rows, {labels} labels, \
         {grouped_rows} rows implied by group sizes"
    )]
    ShapeMismatch {
        feature_rows: usize,
        labels: usize,
        grouped_rows: usize,
    },
    #[error("no group contains both a positive and a negative row")]
    NoComparablePairs,
    #[error("malformed model parameters: {0}")]
    MalformedParams(String),
}

/// A learned ranker over the fixed feature space. The capability is
/// replaceable: anything that can be fitted with per-group boundaries and
/// then emit one order-preserving score per row satisfies the contract.
///
/// `fit` must only compare rows inside one group: `group_sizes` delimits
/// consecutive row runs sharing one opportunity, and cross-group order
/// carries no supervision signal.
pub trait RelevanceRanker: Send + Sync {
    /// Implementation name, recorded in the model artifact.
    fn name(&self) -> &'static str;

    /// Implementation revision, bumped when the training procedure changes.
    fn version(&self) -> &'static str;

    fn fit(
        &mut self,
        features: &[FeatureVector],
        labels: &[u8],
        group_sizes: &[usize],
    ) -> Result<(), RankerError>;

    /// One real-valued relevance score per input row, in input order.
    fn score(&self, features: &[FeatureVector]) -> Vec<f64>;

    /// Opaque parameter blob persisted inside the model artifact.
    fn params(&self) -> Value;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankerConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.1,
            l2: 0.0,
        }
    }
}

/// Ranker hyper-parameters from the environment, defaulting per field.
pub fn load_config_from_env() -> RankerConfig {
    let defaults = RankerConfig::default();
    RankerConfig {
        epochs: std::env::var("ER_RANKER_EPOCHS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.epochs),
        learning_rate: std::env::var("ER_RANKER_LEARNING_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.learning_rate),
        l2: std::env::var("ER_RANKER_L2")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.l2),
    }
}

/// Ranker factory. Unknown names fall back to the trained default so a typo
/// in deployment configuration degrades instead of aborting a run; artifact
/// loading, by contrast, is strict (see `artifact::load_ranker`).
pub fn create_ranker(name: &str, config: RankerConfig) -> Box<dyn RelevanceRanker> {
    match name {
        "pairwise_logistic" => Box::new(PairwiseLogisticRanker::new(config)),
        "uniform" => Box::new(UniformRanker::new()),
        other => {
            warn!(ranker = other, "unknown ranker name; using pairwise_logistic");
            Box::new(PairwiseLogisticRanker::new(config))
        }
    }
}

pub(crate) fn validate_training_shapes(
    features: &[FeatureVector],
    labels: &[u8],
    group_sizes: &[usize],
) -> Result<(), RankerError> {
    if features.is_empty() {
        return Err(RankerError::EmptyTrainingSet);
    }

    let grouped_rows: usize = group_sizes.iter().sum();
    if features.len() != labels.len() || features.len() != grouped_rows {
        return Err(RankerError::ShapeMismatch {
            feature_rows: features.len(),
            labels: labels.len(),
            grouped_rows,
        });
    }

    Ok(())
}

pub(crate) fn dot(weights: &FeatureVector, features: &FeatureVector) -> f64 {
    weights
        .iter()
        .zip(features.iter())
        .map(|(w, x)| w * x)
        .sum()
}

pub(crate) fn weights_from_params(params: &Value) -> Result<FeatureVector, RankerError> {
    let raw = params
        .get("weights")
        .and_then(Value::as_array)
        .ok_or_else(|| RankerError::MalformedParams("missing weights array".into()))?;

    if raw.len() != crate::features::FEATURE_COUNT {
        return Err(RankerError::MalformedParams(format!(
            "expected {} weights, found {}",
            crate::features::FEATURE_COUNT,
            raw.len()
        )));
    }

    let mut weights = [0.0; crate::features::FEATURE_COUNT];
    for (slot, value) in weights.iter_mut().zip(raw.iter()) {
        *slot = value
            .as_f64()
            .ok_or_else(|| RankerError::MalformedParams("non-numeric weight".into()))?;
    }
    Ok(weights)
}
