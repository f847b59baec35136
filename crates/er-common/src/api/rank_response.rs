use serde::{Deserialize, Serialize};

use crate::inference::RankedExecutive;

/// One ranked candidate in the serving response. The response body is the
/// ordered list of these, highest score first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedExecutiveDto {
    pub exec_id: i64,
    pub score: f64,
}

impl From<&RankedExecutive> for RankedExecutiveDto {
    fn from(ranked: &RankedExecutive) -> Self {
        Self {
            exec_id: ranked.exec_id,
            score: ranked.score,
        }
    }
}
