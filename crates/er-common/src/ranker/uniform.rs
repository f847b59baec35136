use serde_json::{json, Value};

use super::{dot, validate_training_shapes, weights_from_params, RankerError, RelevanceRanker};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Equal-weight linear baseline: every feature contributes 1/n. Requires no
/// training, so `fit` only validates shapes. Useful as a cold-start model
/// and as a reference point when judging the trained ranker.
pub struct UniformRanker {
    weights: FeatureVector,
}

impl UniformRanker {
    pub fn new() -> Self {
        Self {
            weights: [1.0 / FEATURE_COUNT as f64; FEATURE_COUNT],
        }
    }

    pub fn from_params(params: &Value) -> Result<Self, RankerError> {
        Ok(Self {
            weights: weights_from_params(params)?,
        })
    }
}

impl Default for UniformRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl RelevanceRanker for UniformRanker {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn version(&self) -> &'static str {
        "v1"
    }

    fn fit(
        &mut self,
        features: &[FeatureVector],
        labels: &[u8],
        group_sizes: &[usize],
    ) -> Result<(), RankerError> {
        validate_training_shapes(features, labels, group_sizes)
    }

    fn score(&self, features: &[FeatureVector]) -> Vec<f64> {
        features.iter().map(|row| dot(&self.weights, row)).collect()
    }

    fn params(&self) -> Value {
        json!({ "weights": self.weights })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_feature_means() {
        let ranker = UniformRanker::new();

        let scores = ranker.score(&[[1.0; 6], [0.0; 6], [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);

        assert!((scores[0] - 1.0).abs() < 1e-12);
        assert_eq!(scores[1], 0.0);
        assert!((scores[2] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn a_dominant_row_scores_strictly_higher() {
        let ranker = UniformRanker::new();

        let scores = ranker.score(&[[1.0; 6], [0.0; 6]]);

        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn fit_validates_but_does_not_change_weights() {
        let mut ranker = UniformRanker::new();
        let before = ranker.params();

        ranker
            .fit(&[[1.0; 6], [0.0; 6]], &[1, 0], &[2])
            .expect("fit");

        assert_eq!(ranker.params(), before);
    }
}
