use std::collections::BTreeSet;

use serde_json::Value;

/// Decode a serialized collection (a JSON array in a string) into a set of
/// canonical element strings. Absent, empty, or undecodable input is `None`.
///
/// Elements may be strings or bare scalars (category codes are sometimes
/// numeric); each is canonicalized so `["7", 7]` collapses to one element.
pub fn decode_collection(raw: Option<&str>) -> Option<BTreeSet<String>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        Ok(_) | Err(_) => {
            tracing::debug!(raw, "undecodable encoded collection; treating as absent");
            None
        }
    }
}

/// Set-overlap similarity between two encoded collections, in [0, 1].
///
/// Decoding failure, absence, or an empty union all yield 0.0, never an
/// error. Commutative and order-independent.
pub fn jaccard_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    let (Some(set_a), Some(set_b)) = (decode_collection(a), decode_collection(b)) else {
        return 0.0;
    };

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_collections_have_similarity_one() {
        let sim = jaccard_similarity(Some(r#"["health","care"]"#), Some(r#"["health","care"]"#));
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn element_order_does_not_matter() {
        let sim = jaccard_similarity(Some(r#"["care","health"]"#), Some(r#"["health","care"]"#));
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn partial_overlap_is_intersection_over_union() {
        let sim = jaccard_similarity(Some(r#"["a","b","c"]"#), Some(r#"["b","c","d"]"#));
        assert!((sim - 0.5).abs() < 1e-12);
    }

    #[test]
    fn disjoint_collections_have_similarity_zero() {
        let sim = jaccard_similarity(Some(r#"["retail"]"#), Some(r#"["health"]"#));
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn commutative_for_all_inputs() {
        let cases = [
            (Some(r#"["a","b"]"#), Some(r#"["b"]"#)),
            (Some("not json"), Some(r#"["b"]"#)),
            (None, Some(r#"["b"]"#)),
            (Some("[]"), Some("[]")),
            (Some("{}"), Some("not json")),
        ];
        for (a, b) in cases {
            assert_eq!(jaccard_similarity(a, b), jaccard_similarity(b, a));
        }
    }

    #[test]
    fn undecodable_or_missing_input_yields_zero() {
        assert_eq!(jaccard_similarity(None, Some(r#"["a"]"#)), 0.0);
        assert_eq!(jaccard_similarity(Some(""), Some(r#"["a"]"#)), 0.0);
        assert_eq!(jaccard_similarity(Some("garbage"), Some(r#"["a"]"#)), 0.0);
        assert_eq!(jaccard_similarity(Some(r#"{"k":1}"#), Some(r#"["a"]"#)), 0.0);
    }

    #[test]
    fn empty_union_is_zero_not_nan() {
        let sim = jaccard_similarity(Some("[]"), Some("[]"));
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
    }

    #[test]
    fn numeric_codes_are_canonicalized() {
        let sim = jaccard_similarity(Some("[7, 12]"), Some(r#"["7","12"]"#));
        assert_eq!(sim, 1.0);
    }
}
