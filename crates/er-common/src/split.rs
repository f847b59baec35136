use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::dataset::FeatureRow;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("cannot hold out {requested} groups from a universe of {total}")]
    TooFewGroups { total: usize, requested: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    /// Fraction of groups held out for evaluation.
    pub holdout_fraction: f64,
    /// Floor on the held-out group count.
    pub min_test_groups: usize,
    /// Fixed seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.1,
            min_test_groups: 3,
            seed: None,
        }
    }
}

impl SplitConfig {
    pub fn from_env() -> Self {
        Self {
            holdout_fraction: std::env::var("ER_HOLDOUT_FRACTION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.1),
            min_test_groups: std::env::var("ER_MIN_TEST_GROUPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            seed: std::env::var("ER_SPLIT_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    fn test_group_count(&self, total_groups: usize) -> usize {
        let fractional = (self.holdout_fraction * total_groups as f64).ceil() as usize;
        fractional.max(self.min_test_groups)
    }
}

/// Rows re-grouped after a split: group-contiguous in deterministic key
/// order, with the per-group item counts the ranker and the evaluator need
/// to reconstruct group boundaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedRows {
    pub rows: Vec<FeatureRow>,
    pub group_sizes: Vec<usize>,
}

impl GroupedRows {
    pub fn group_count(&self) -> usize {
        self.group_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn distinct_group_keys(rows: &[FeatureRow]) -> Vec<i64> {
    let mut keys: Vec<i64> = rows.iter().map(|row| row.assignment_id).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

fn collect_groups(rows: &[FeatureRow], keys: &[i64]) -> GroupedRows {
    let mut grouped = GroupedRows::default();
    for &key in keys {
        let before = grouped.rows.len();
        grouped
            .rows
            .extend(rows.iter().filter(|row| row.assignment_id == key).cloned());
        grouped.group_sizes.push(grouped.rows.len() - before);
    }
    grouped
}

/// Partition GROUPS (never rows) into train and test sets, so no
/// opportunity's candidates straddle the two partitions. The held-out set
/// has `max(min_test_groups, ceil(holdout_fraction × total))` groups sampled
/// without replacement; everything else trains.
pub fn split_by_group(
    rows: &[FeatureRow],
    config: &SplitConfig,
) -> Result<(GroupedRows, GroupedRows), SplitError> {
    let keys = distinct_group_keys(rows);
    let requested = config.test_group_count(keys.len());

    if requested >= keys.len() {
        return Err(SplitError::TooFewGroups {
            total: keys.len(),
            requested,
        });
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut test_keys: Vec<i64> = keys
        .choose_multiple(&mut rng, requested)
        .copied()
        .collect();
    test_keys.sort_unstable();
    let test_set: HashSet<i64> = test_keys.iter().copied().collect();

    let train_keys: Vec<i64> = keys
        .iter()
        .copied()
        .filter(|key| !test_set.contains(key))
        .collect();

    tracing::info!(
        total_groups = keys.len(),
        train_groups = train_keys.len(),
        test_groups = test_keys.len(),
        "grouped train/test split"
    );

    Ok((
        collect_groups(rows, &train_keys),
        collect_groups(rows, &test_keys),
    ))
}
