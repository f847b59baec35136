use axum::{extract::State, Json};

use er_common::api::{RankRequest, RankedExecutiveDto};
use er_common::inference::rank_executives_for_opportunity;

use crate::error::ApiError;
use crate::SharedState;

const MAX_RESULTS: usize = 200;

/// Score the full executive pool against one new opportunity and return the
/// ordered top-N. The pool and the model are process-wide read-only state;
/// the handler holds no locks and mutates nothing.
pub async fn rank(
    State(state): State<SharedState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<Vec<RankedExecutiveDto>>, ApiError> {
    let limit = request
        .limit
        .unwrap_or(state.config.top_n)
        .clamp(1, MAX_RESULTS);

    let ranked = rank_executives_for_opportunity(
        &request.opportunity,
        &state.executives,
        state.ranker.as_ref(),
        limit,
    );

    er_metrics::record_rank_request(state.executives.len(), ranked.len());

    Ok(Json(ranked.iter().map(RankedExecutiveDto::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;
    use er_common::Opportunity;

    fn request(limit: Option<usize>) -> RankRequest {
        RankRequest {
            opportunity: Opportunity {
                assignment_id: None,
                sectors: Some(r#"["health"]"#.into()),
                sub_sectors: None,
                industry: None,
                country: Some("UK".into()),
                scale: Some("large".into()),
            },
            limit,
        }
    }

    #[tokio::test]
    async fn ranks_the_matching_executive_first() {
        let response = rank(State(test_state()), Json(request(None)))
            .await
            .expect("rank");

        let results = response.0;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].exec_id, 1);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn limit_caps_the_result_list() {
        let response = rank(State(test_state()), Json(request(Some(1))))
            .await
            .expect("rank");

        assert_eq!(response.0.len(), 1);
    }

    #[tokio::test]
    async fn zero_limit_is_clamped_to_one() {
        let response = rank(State(test_state()), Json(request(Some(0))))
            .await
            .expect("rank");

        assert_eq!(response.0.len(), 1);
    }
}
