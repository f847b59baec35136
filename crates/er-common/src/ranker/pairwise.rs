use serde_json::{json, Value};

use super::{dot, validate_training_shapes, weights_from_params, RankerConfig, RankerError};
use super::RelevanceRanker;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Linear pairwise ranker trained on within-group (positive, negative)
/// pairs with a logistic loss. Weights start at zero and updates follow a
/// fixed iteration order, so a given training set always produces the same
/// model.
pub struct PairwiseLogisticRanker {
    config: RankerConfig,
    weights: FeatureVector,
}

impl PairwiseLogisticRanker {
    pub fn new(config: RankerConfig) -> Self {
        Self {
            config,
            weights: [0.0; FEATURE_COUNT],
        }
    }

    pub fn from_params(config: RankerConfig, params: &Value) -> Result<Self, RankerError> {
        Ok(Self {
            config,
            weights: weights_from_params(params)?,
        })
    }

    pub fn weights(&self) -> &FeatureVector {
        &self.weights
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl RelevanceRanker for PairwiseLogisticRanker {
    fn name(&self) -> &'static str {
        "pairwise_logistic"
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
        validate_training_shapes(features, labels, group_sizes)?;

        // Precompute per-group (positive, negative) index pairs once; the
        // epochs then sweep the same pair list.
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        let mut offset = 0;
        for &size in group_sizes {
            let range = offset..offset + size;
            for i in range.clone() {
                if labels[i] != 1 {
                    continue;
                }
                for j in range.clone() {
                    if labels[j] == 0 {
                        pairs.push((i, j));
                    }
                }
            }
            offset += size;
        }

        if pairs.is_empty() {
            return Err(RankerError::NoComparablePairs);
        }

        let mut weights = [0.0; FEATURE_COUNT];
        for _ in 0..self.config.epochs {
            for &(pos, neg) in &pairs {
                let mut diff = [0.0; FEATURE_COUNT];
                for k in 0..FEATURE_COUNT {
                    diff[k] = features[pos][k] - features[neg][k];
                }

                let margin = dot(&weights, &diff);
                let gradient = sigmoid(margin) - 1.0;
                for k in 0..FEATURE_COUNT {
                    weights[k] -=
                        self.config.learning_rate * (gradient * diff[k] + self.config.l2 * weights[k]);
                }
            }
        }

        self.weights = weights;
        tracing::debug!(
            pairs = pairs.len(),
            epochs = self.config.epochs,
            weights = ?self.weights,
            "fitted pairwise logistic ranker"
        );
        Ok(())
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

    fn positive_row() -> FeatureVector {
        [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
    }

    fn negative_row() -> FeatureVector {
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    fn simple_training_set() -> (Vec<FeatureVector>, Vec<u8>, Vec<usize>) {
        // Two groups; in each the positive row dominates on every feature.
        let features = vec![
            positive_row(),
            negative_row(),
            [1.0, 0.0, 1.0, 0.8, 0.5, 0.2],
            [0.0, 1.0, 0.0, 0.1, 0.0, 0.0],
        ];
        let labels = vec![1, 0, 1, 0];
        let group_sizes = vec![2, 2];
        (features, labels, group_sizes)
    }

    #[test]
    fn learns_to_rank_dominant_rows_higher() {
        let (features, labels, group_sizes) = simple_training_set();
        let mut ranker = PairwiseLogisticRanker::new(RankerConfig::default());

        ranker.fit(&features, &labels, &group_sizes).expect("fit");

        let scores = ranker.score(&[positive_row(), negative_row()]);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn training_is_deterministic() {
        let (features, labels, group_sizes) = simple_training_set();

        let mut first = PairwiseLogisticRanker::new(RankerConfig::default());
        let mut second = PairwiseLogisticRanker::new(RankerConfig::default());
        first.fit(&features, &labels, &group_sizes).expect("fit");
        second.fit(&features, &labels, &group_sizes).expect("fit");

        assert_eq!(first.weights(), second.weights());
    }

    #[test]
    fn score_preserves_input_order() {
        let (features, labels, group_sizes) = simple_training_set();
        let mut ranker = PairwiseLogisticRanker::new(RankerConfig::default());
        ranker.fit(&features, &labels, &group_sizes).expect("fit");

        let batch = vec![negative_row(), positive_row(), negative_row()];
        let scores = ranker.score(&batch);

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], scores[2]);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn groups_with_one_label_yield_no_pairs() {
        let features = vec![positive_row(), positive_row()];
        let labels = vec![1, 1];
        let mut ranker = PairwiseLogisticRanker::new(RankerConfig::default());

        let err = ranker.fit(&features, &labels, &[2]).unwrap_err();
        assert!(matches!(err, RankerError::NoComparablePairs));
    }

    #[test]
    fn params_round_trip() {
        let (features, labels, group_sizes) = simple_training_set();
        let mut ranker = PairwiseLogisticRanker::new(RankerConfig::default());
        ranker.fit(&features, &labels, &group_sizes).expect("fit");

        let restored =
            PairwiseLogisticRanker::from_params(RankerConfig::default(), &ranker.params())
                .expect("restore");

        assert_eq!(restored.weights(), ranker.weights());
    }

    #[test]
    fn pairs_never_cross_group_boundaries() {
        // Group 1 is all-positive, group 2 all-negative. If pairs crossed
        // the boundary, fitting would succeed; it must not.
        let features = vec![positive_row(), positive_row(), negative_row()];
        let labels = vec![1, 1, 0];
        let mut ranker = PairwiseLogisticRanker::new(RankerConfig::default());

        let err = ranker.fit(&features, &labels, &[2, 1]).unwrap_err();
        assert!(matches!(err, RankerError::NoComparablePairs));
    }
}
