//! Run snapshot: the immutable input bundle for one selected run.
//!
//! A snapshot is fetched once per run selection and never mutated; every
//! derived view is recomputed from it.

use crate::model::{parse_elements, ClusterSummary, Comparison, Recommendation, Run};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSnapshot {
    #[serde(default)]
    pub run: Run,
    #[serde(default)]
    pub summary: ClusterSummary,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// Optional; its absence never affects aggregation.
    #[serde(default)]
    pub comparison: Option<Comparison>,
}

impl RunSnapshot {
    pub fn new(run: Run, summary: ClusterSummary, recommendations: Vec<Recommendation>) -> Self {
        Self {
            run,
            summary,
            recommendations,
            comparison: None,
        }
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// Parse a snapshot document. Each top-level section decodes on its
    /// own, so a broken recommendation list still leaves the summary
    /// intact. Only unparsable JSON yields an empty snapshot.
    pub fn from_json_lenient(content: &str) -> Self {
        let doc: Value = match serde_json::from_str(content) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("Malformed run snapshot ignored: {e}");
                return Self::default();
            }
        };
        Self {
            run: section(&doc, "run"),
            summary: section(&doc, "summary"),
            recommendations: records(&doc, "recommendations"),
            comparison: section(&doc, "comparison"),
        }
    }
}

/// Missing or null reads as the default; a bad value is logged and dropped.
fn section<T: DeserializeOwned + Default>(doc: &Value, key: &str) -> T {
    match doc.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::warn!("Malformed snapshot section `{key}` ignored: {e}");
            T::default()
        }),
    }
}

fn records(doc: &Value, key: &str) -> Vec<Recommendation> {
    match doc.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => parse_elements(items.clone()),
        Some(other) => {
            log::warn!("Snapshot section `{key}` is not a list: {other}");
            Vec::new()
        }
    }
}
