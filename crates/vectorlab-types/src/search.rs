//! Distance metrics and search result types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records with no full-text match are still returned by hybrid search when
/// their vector distance is below this value.
pub const HYBRID_DISTANCE_THRESHOLD: f64 = 0.5;

/// Distance metric used for ordering and for the reported `distance`.
///
/// Lower is always more similar. Cosine and Euclidean distances of a vector
/// to itself are 0; inner product is reported negated by pgvector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    #[serde(rename = "cosine")]
    Cosine,
    #[serde(rename = "l2", alias = "euclidean")]
    Euclidean,
    #[serde(rename = "inner", alias = "ip")]
    InnerProduct,
}

impl DistanceMetric {
    /// pgvector distance operator.
    pub fn operator(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "<=>",
            DistanceMetric::Euclidean => "<->",
            DistanceMetric::InnerProduct => "<#>",
        }
    }

    /// pgvector operator class for index creation.
    pub fn operator_class(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "vector_cosine_ops",
            DistanceMetric::Euclidean => "vector_l2_ops",
            DistanceMetric::InnerProduct => "vector_ip_ops",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => write!(f, "cosine"),
            DistanceMetric::Euclidean => write!(f, "l2"),
            DistanceMetric::InnerProduct => write!(f, "inner"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "l2" | "euclidean" => Ok(DistanceMetric::Euclidean),
            "inner" | "ip" | "inner_product" => Ok(DistanceMetric::InnerProduct),
            other => Err(format!("invalid distance metric: '{other}'")),
        }
    }
}

/// One row returned by a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarHit {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Distance under the store's configured metric.
    pub distance: f64,
}

/// One row returned by a hybrid (full-text + vector) search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridHit {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub distance: f64,
    /// `ts_rank` of the content against the query text; 0 without a match.
    pub rank: f64,
    /// Whether the content matched the full-text query.
    pub text_match: bool,
}

impl HybridHit {
    /// Whether this row is eligible for hybrid results at all.
    pub fn qualifies(&self) -> bool {
        self.text_match || self.distance < HYBRID_DISTANCE_THRESHOLD
    }

    /// Hybrid ordering: text matches first by rank descending, then
    /// distance ascending. Rank is ignored for rows without a match.
    pub fn relevance_order(a: &HybridHit, b: &HybridHit) -> Ordering {
        b.text_match
            .cmp(&a.text_match)
            .then_with(|| match a.text_match && b.text_match {
                true => b.rank.total_cmp(&a.rank),
                false => Ordering::Equal,
            })
            .then_with(|| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: i64, rank: f64, distance: f64, text_match: bool) -> HybridHit {
        HybridHit {
            id,
            username: "u".to_string(),
            content: "c".to_string(),
            title: None,
            created_at: Utc::now(),
            distance,
            rank,
            text_match,
        }
    }

    #[test]
    fn test_metric_operators() {
        assert_eq!(DistanceMetric::Cosine.operator(), "<=>");
        assert_eq!(DistanceMetric::Euclidean.operator(), "<->");
        assert_eq!(DistanceMetric::InnerProduct.operator(), "<#>");
        assert_eq!(DistanceMetric::default(), DistanceMetric::Cosine);
    }

    #[test]
    fn test_metric_operator_classes() {
        assert_eq!(DistanceMetric::Cosine.operator_class(), "vector_cosine_ops");
        assert_eq!(DistanceMetric::Euclidean.operator_class(), "vector_l2_ops");
        assert_eq!(DistanceMetric::InnerProduct.operator_class(), "vector_ip_ops");
    }

    #[test]
    fn test_metric_parse_aliases() {
        assert_eq!("COSINE".parse::<DistanceMetric>(), Ok(DistanceMetric::Cosine));
        assert_eq!("euclidean".parse::<DistanceMetric>(), Ok(DistanceMetric::Euclidean));
        assert_eq!("ip".parse::<DistanceMetric>(), Ok(DistanceMetric::InnerProduct));
        assert!("manhattan".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_metric_display_parses_back() {
        for metric in [
            DistanceMetric::Cosine,
            DistanceMetric::Euclidean,
            DistanceMetric::InnerProduct,
        ] {
            assert_eq!(metric.to_string().parse::<DistanceMetric>(), Ok(metric));
        }
    }

    #[test]
    fn test_metric_serde_uses_short_names() {
        let json = serde_json::to_string(&DistanceMetric::Euclidean).unwrap();
        assert_eq!(json, "\"l2\"");
        let parsed: DistanceMetric = serde_json::from_str("\"euclidean\"").unwrap();
        assert_eq!(parsed, DistanceMetric::Euclidean);
    }

    #[test]
    fn test_hybrid_order_text_matches_first_then_vector_only() {
        let a = hit(1, 0.8, 0.45, true);
        let b = hit(2, 0.5, 0.10, true);
        let c = hit(3, 0.0, 0.30, false);

        let mut hits = vec![c, b, a];
        hits.sort_by(HybridHit::relevance_order);

        let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_hybrid_order_rank_ties_broken_by_distance() {
        let far = hit(1, 0.5, 0.40, true);
        let near = hit(2, 0.5, 0.05, true);

        let mut hits = vec![far, near];
        hits.sort_by(HybridHit::relevance_order);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn test_hybrid_order_ignores_rank_without_text_match() {
        // ts_rank can be tiny but non-zero when only some query terms occur.
        let near = hit(1, 0.0, 0.10, false);
        let partial_term = hit(2, 1e-20, 0.45, false);

        let mut hits = vec![partial_term, near];
        hits.sort_by(HybridHit::relevance_order);
        let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_hybrid_inclusion_rule() {
        assert!(hit(1, 0.2, 0.9, true).qualifies());
        assert!(hit(2, 0.0, 0.49, false).qualifies());
        assert!(!hit(3, 0.0, 0.5, false).qualifies());
        assert!(!hit(4, 0.0, 0.8, false).qualifies());
    }
}
