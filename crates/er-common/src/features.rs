use crate::encoded_set::jaccard_similarity;
use crate::{Executive, Opportunity};

/// Feature order is load-bearing: the trained model artifact binds to this
/// exact list, and serving rebuilds vectors in the same order. Changing it
/// invalidates every persisted model.
pub const FEATURE_NAMES: [&str; 6] = [
    "sector_match",
    "country_match",
    "scale_match",
    "sector_jaccard",
    "sub_sector_jaccard",
    "industry_jaccard",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Exact-equality indicator over raw encoded values. Two absent values do
/// not match. Note this is intentionally NOT a set comparison: the same
/// collection serialized in a different element order is a mismatch, while
/// the `*_jaccard` features below compare the decoded sets. The asymmetry is
/// part of the model's semantics.
fn match_indicator(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(left), Some(right)) if left == right => 1.0,
        _ => 0.0,
    }
}

/// Build the fixed-order feature vector for one (opportunity, executive)
/// pair. Total: malformed or missing fields degrade to 0.0 components, so
/// the same call is safe over historical pairs at training time and over an
/// arbitrary candidate pool at serving time.
pub fn build_features(opportunity: &Opportunity, executive: &Executive) -> FeatureVector {
    [
        match_indicator(executive.sectors.as_deref(), opportunity.sectors.as_deref()),
        match_indicator(
            executive.hq_country.as_deref(),
            opportunity.country.as_deref(),
        ),
        match_indicator(executive.scale.as_deref(), opportunity.scale.as_deref()),
        jaccard_similarity(executive.sectors.as_deref(), opportunity.sectors.as_deref()),
        jaccard_similarity(
            executive.sub_sectors.as_deref(),
            opportunity.sub_sectors.as_deref(),
        ),
        jaccard_similarity(
            executive.industry.as_deref(),
            opportunity.industry.as_deref(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opportunity() -> Opportunity {
        Opportunity {
            assignment_id: Some(1),
            sectors: Some(r#"["health"]"#.into()),
            sub_sectors: Some(r#"["hospitals"]"#.into()),
            industry: Some(r#"["care"]"#.into()),
            country: Some("UK".into()),
            scale: Some("large".into()),
        }
    }

    #[test]
    fn fully_matching_pair_scores_one_everywhere() {
        let exec = Executive {
            exec_id: Some(10),
            sectors: Some(r#"["health"]"#.into()),
            sub_sectors: Some(r#"["hospitals"]"#.into()),
            industry: Some(r#"["care"]"#.into()),
            hq_country: Some("UK".into()),
            scale: Some("large".into()),
        };

        assert_eq!(build_features(&opportunity(), &exec), [1.0; 6]);
    }

    #[test]
    fn fully_mismatching_pair_scores_zero_everywhere() {
        let exec = Executive {
            exec_id: Some(11),
            sectors: Some(r#"["retail"]"#.into()),
            sub_sectors: Some(r#"["grocery"]"#.into()),
            industry: Some(r#"["fmcg"]"#.into()),
            hq_country: Some("US".into()),
            scale: Some("small".into()),
        };

        assert_eq!(build_features(&opportunity(), &exec), [0.0; 6]);
    }

    #[test]
    fn absent_fields_never_match() {
        let exec = Executive::default();
        let empty_opp = Opportunity::default();

        assert_eq!(build_features(&empty_opp, &exec), [0.0; 6]);
    }

    #[test]
    fn reordered_serialization_mismatches_raw_but_overlaps_fully() {
        let mut opp = opportunity();
        opp.sectors = Some(r#"["health","care"]"#.into());
        let exec = Executive {
            sectors: Some(r#"["care","health"]"#.into()),
            ..Executive::default()
        };

        let features = build_features(&opp, &exec);
        assert_eq!(features[0], 0.0, "raw equality must see a mismatch");
        assert_eq!(features[3], 1.0, "decoded overlap must be total");
    }

    #[test]
    fn malformed_collection_degrades_to_zero_components() {
        let exec = Executive {
            sectors: Some("not a list".into()),
            hq_country: Some("UK".into()),
            ..Executive::default()
        };

        let features = build_features(&opportunity(), &exec);
        assert_eq!(features[0], 0.0);
        assert_eq!(features[1], 1.0);
        assert_eq!(features[3], 0.0);
    }

    #[test]
    fn feature_names_and_vector_stay_aligned() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        let features = build_features(&opportunity(), &Executive::default());
        assert_eq!(features.len(), FEATURE_COUNT);
    }
}
