use std::cmp::Ordering;

use crate::features::build_features;
use crate::ranker::RelevanceRanker;
use crate::{Executive, Opportunity};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedExecutive {
    pub exec_id: i64,
    pub score: f64,
}

/// Score one new opportunity against the full executive pool and return the
/// top-N candidates by descending score (stable ties). Every executive with
/// an id is a candidate (no pre-filtering), and a malformed record
/// only degrades its own features. Purely functional over its inputs.
pub fn rank_executives_for_opportunity(
    opportunity: &Opportunity,
    executives: &[Executive],
    ranker: &dyn RelevanceRanker,
    top_n: usize,
) -> Vec<RankedExecutive> {
    let mut candidate_ids = Vec::with_capacity(executives.len());
    let mut feature_rows = Vec::with_capacity(executives.len());
    let mut skipped_without_id = 0usize;

    for executive in executives {
        let Some(exec_id) = executive.exec_id else {
            skipped_without_id += 1;
            continue;
        };
        candidate_ids.push(exec_id);
        feature_rows.push(build_features(opportunity, executive));
    }

    if skipped_without_id > 0 {
        tracing::debug!(skipped_without_id, "candidates without an id were skipped");
    }

    let scores = ranker.score(&feature_rows);

    let mut ranked: Vec<RankedExecutive> = candidate_ids
        .into_iter()
        .zip(scores)
        .map(|(exec_id, score)| RankedExecutive { exec_id, score })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(top_n);
    ranked
}
