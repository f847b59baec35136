use serde::Deserialize;

use crate::Opportunity;

/// Ranking request from the HTTP layer: one new opportunity, with an
/// optional cap on how many candidates come back.
#[derive(Debug, Clone, Deserialize)]
pub struct RankRequest {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    #[serde(default)]
    pub limit: Option<usize>,
}
