//! Read-only input shapes produced upstream by the batch segmentation run.
//!
//! Every field deserialises leniently: a missing or null value becomes
//! the zero/empty default rather than failing the whole document.

use crate::types::{ClusterId, CustomerId, RecommendationId, RunId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

// ── Run ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RunStatus {
    #[default]
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl From<String> for RunStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            _ => Self::Running,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    #[serde(default, deserialize_with = "null_as_default")]
    pub run_id: RunId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RunStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customers_processed: Option<u64>,
    #[serde(default)]
    pub clusters_count: Option<u64>,
}

// ── Cluster summary ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterSummaryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster_id: ClusterId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_count: u64,
    #[serde(default)]
    pub avg_distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendation_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_acceptance_probability: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_expected_revenue: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_acceptance_probability: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_acceptance_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub run_id: RunId,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub clusters: Vec<ClusterSummaryEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_customers_processed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_recommendations: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_expected_revenue: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_acceptance_probability: f64,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub products: Vec<ProductSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ClusterSummary {
    /// Parse a summary document. Malformed input degrades to an empty
    /// summary so downstream views render as zeroed rather than failing.
    pub fn from_json_lenient(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            log::warn!("Malformed cluster summary ignored: {e}");
            Self::default()
        })
    }
}

/// One customer's cluster membership within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub customer_id: CustomerId,
    pub cluster_id: ClusterId,
    #[serde(default)]
    pub distance_to_centroid: Option<f64>,
}

// ── Recommendation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    Sent,
    Dismissed,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Dismissed => "dismissed",
        }
    }
}

impl From<String> for RecommendationStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sent" => Self::Sent,
            "dismissed" => Self::Dismissed,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelConfidence {
    High,
    Medium,
    Low,
}

impl ModelConfidence {
    pub fn from_probability(p: f64) -> Self {
        if p > 0.7 {
            Self::High
        } else if p > 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: RecommendationId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_id: CustomerId,
    /// Raw name as stored upstream; may be a CSV row (`id,last,first,...`).
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub cluster_id: Option<ClusterId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub acceptance_probability: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expected_revenue: f64,
    #[serde(default)]
    pub customer_income: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RecommendationStatus,
}

impl Recommendation {
    pub fn model_confidence(&self) -> ModelConfidence {
        ModelConfidence::from_probability(self.acceptance_probability)
    }
}

// ── Comparison ───────────────────────────────────────────────────────────────

/// Aggregate metrics of a single run, used on both sides of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub customers: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_acceptance_prob: f64,
}

/// Percent changes versus the previous run. `None` when the previous
/// value was zero and the change is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonChanges {
    #[serde(default)]
    pub customers_percent: Option<f64>,
    #[serde(default)]
    pub recommendations_percent: Option<f64>,
    #[serde(default)]
    pub revenue_percent: Option<f64>,
    #[serde(default)]
    pub acceptance_prob_percent: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster_stability_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_run_id: RunId,
    #[serde(default)]
    pub previous_run_id: Option<RunId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_comparison: bool,
    #[serde(default)]
    pub current: Option<RunMetrics>,
    #[serde(default)]
    pub previous: Option<RunMetrics>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: ComparisonChanges,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ── Lenient field helpers ────────────────────────────────────────────────────

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A null list reads as empty and unparsable elements are dropped. A
/// value that is not a list at all is still an error.
fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(parse_elements(raw.unwrap_or_default()))
}

/// Decode each element on its own, logging and skipping the ones that fail.
pub(crate) fn parse_elements<T: DeserializeOwned>(raw: Vec<serde_json::Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping malformed element {i}: {e}");
                None
            }
        })
        .collect()
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Accepts RFC 3339 or a naive ISO-8601 timestamp (interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_with_nulls_degrades_to_defaults() {
        let rec: Recommendation = serde_json::from_str(
            r#"{"id": 7, "customer_id": "C7", "customer_name": null, "cluster_id": null,
                "product_code": null, "acceptance_probability": null,
                "expected_revenue": null, "customer_income": null, "status": null}"#,
        )
        .unwrap();
        assert_eq!(rec.id, 7);
        assert_eq!(rec.cluster_id, None);
        assert_eq!(rec.product_code, "");
        assert_eq!(rec.expected_revenue, 0.0);
        assert_eq!(rec.status, RecommendationStatus::Pending);
    }

    #[test]
    fn unknown_status_strings_fall_back() {
        let rec: Recommendation = serde_json::from_str(r#"{"status": "ARCHIVED"}"#).unwrap();
        assert_eq!(rec.status, RecommendationStatus::Pending);
        let run: Run = serde_json::from_str(r#"{"run_id": 1, "status": "Success"}"#).unwrap();
        assert_eq!(run.status, RunStatus::Success);
    }

    #[test]
    fn timestamps_accept_naive_iso_and_rfc3339() {
        let naive = parse_timestamp("2025-12-01T10:30:00.123456").unwrap();
        let zoned = parse_timestamp("2025-12-01T10:30:00.123456Z").unwrap();
        assert_eq!(naive, zoned);
        assert!(parse_timestamp("yesterday").is_none());

        let run: Run =
            serde_json::from_str(r#"{"run_id": 2, "started_at": "not a date"}"#).unwrap();
        assert_eq!(run.started_at, None);
    }

    #[test]
    fn model_confidence_bands() {
        assert_eq!(ModelConfidence::from_probability(0.71), ModelConfidence::High);
        assert_eq!(ModelConfidence::from_probability(0.7), ModelConfidence::Medium);
        assert_eq!(ModelConfidence::from_probability(0.5), ModelConfidence::Low);
    }

    #[test]
    fn bad_cluster_entry_is_dropped_not_the_summary() {
        let summary = ClusterSummary::from_json_lenient(
            r#"{"run_id": 4, "total_recommendations": 9,
                "clusters": [{"cluster_id": 0, "customer_count": 10},
                             {"cluster_id": "two", "customer_count": 5},
                             {"cluster_id": 3, "customer_count": null}],
                "products": null}"#,
        );
        assert_eq!(summary.run_id, 4);
        assert_eq!(summary.total_recommendations, 9);
        let ids: Vec<ClusterId> = summary.clusters.iter().map(|c| c.cluster_id).collect();
        assert_eq!(ids, vec![0, 3]);
        assert_eq!(summary.clusters[1].customer_count, 0);
        assert!(summary.products.is_empty());
    }

    #[test]
    fn malformed_summary_is_empty() {
        let summary = ClusterSummary::from_json_lenient("{ not json");
        assert!(summary.clusters.is_empty());
        let summary = ClusterSummary::from_json_lenient(r#"{"clusters": "oops"}"#);
        assert_eq!(summary, ClusterSummary::default());
    }
}
