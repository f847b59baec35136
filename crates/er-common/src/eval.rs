use thiserror::Error;

use crate::dataset::FeatureRow;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("k must be at least 1")]
    ZeroK,
    #[error("no groups to evaluate")]
    NoGroups,
    #[error(
        "evaluation shapes disagree: {rows} rows, {scores} scores, \
         {grouped_rows} rows implied by group sizes"
    )]
    ShapeMismatch {
        rows: usize,
        scores: usize,
        grouped_rows: usize,
    },
}

/// Precision@K over groups: a group is a hit when any of its top-K rows by
/// descending score carries label 1. Ties are broken by original row order
/// (stable sort). Returns the mean hit rate, always in [0, 1].
pub fn precision_at_k(
    rows: &[FeatureRow],
    scores: &[f64],
    group_sizes: &[usize],
    k: usize,
) -> Result<f64, EvalError> {
    if k == 0 {
        return Err(EvalError::ZeroK);
    }
    if group_sizes.is_empty() {
        return Err(EvalError::NoGroups);
    }

    let grouped_rows: usize = group_sizes.iter().sum();
    if rows.len() != scores.len() || rows.len() != grouped_rows {
        return Err(EvalError::ShapeMismatch {
            rows: rows.len(),
            scores: scores.len(),
            grouped_rows,
        });
    }

    let mut hits = 0usize;
    let mut offset = 0usize;
    for &size in group_sizes {
        let group = offset..offset + size;

        let mut order: Vec<usize> = group.collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let hit = order
            .iter()
            .take(k)
            .any(|&index| rows[index].label == 1);
        hits += usize::from(hit);
        offset += size;
    }

    Ok(hits as f64 / group_sizes.len() as f64)
}
