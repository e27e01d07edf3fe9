//! Run-over-run comparison: metric deltas and cluster stability.

use crate::{
    model::{ClusterAssignment, Comparison, ComparisonChanges, Recommendation, RunMetrics},
    types::{ClusterId, RunId},
};
use std::collections::{HashMap, HashSet};

pub const LOW_STABILITY_PERCENT: f64 = 70.0;
pub const CUSTOMER_DRIFT_PERCENT: f64 = 20.0;

/// Raw inputs of one run.
#[derive(Debug, Clone, Copy)]
pub struct RunData<'a> {
    pub run_id: RunId,
    pub assignments: &'a [ClusterAssignment],
    pub recommendations: &'a [Recommendation],
}

impl RunMetrics {
    /// Metrics over the run's clustered customers and their recommendations.
    pub fn collect(assignments: &[ClusterAssignment], recommendations: &[Recommendation]) -> Self {
        let customers: HashSet<&str> = assignments.iter().map(|a| a.customer_id.as_str()).collect();
        let mut rec_ids = HashSet::new();
        let mut revenue = 0.0;
        let mut probability_sum = 0.0;
        let mut matched = 0u64;
        for rec in recommendations
            .iter()
            .filter(|r| customers.contains(r.customer_id.as_str()))
        {
            rec_ids.insert(rec.id);
            revenue += rec.expected_revenue;
            probability_sum += rec.acceptance_probability;
            matched += 1;
        }
        Self {
            customers: customers.len() as u64,
            recommendations: rec_ids.len() as u64,
            revenue,
            avg_acceptance_prob: if matched == 0 { 0.0 } else { probability_sum / matched as f64 },
        }
    }
}

/// `(current - previous) / previous * 100`; undefined when previous is 0.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Share of the current run's customers that stayed in the same cluster.
pub fn cluster_stability_percent(
    current: &[ClusterAssignment],
    previous: &[ClusterAssignment],
) -> f64 {
    let prior: HashMap<&str, ClusterId> = previous
        .iter()
        .map(|a| (a.customer_id.as_str(), a.cluster_id))
        .collect();
    let total: HashSet<&str> = current.iter().map(|a| a.customer_id.as_str()).collect();
    if total.is_empty() {
        return 0.0;
    }
    let stable = current
        .iter()
        .filter(|a| prior.get(a.customer_id.as_str()) == Some(&a.cluster_id))
        .count();
    stable as f64 / total.len() as f64 * 100.0
}

pub fn compare(current: &RunData<'_>, previous: Option<&RunData<'_>>) -> Comparison {
    let Some(previous) = previous else {
        return Comparison {
            current_run_id: current.run_id,
            message: Some("No previous successful run found for comparison".to_string()),
            ..Comparison::default()
        };
    };

    let now = RunMetrics::collect(current.assignments, current.recommendations);
    let before = RunMetrics::collect(previous.assignments, previous.recommendations);
    let stability = cluster_stability_percent(current.assignments, previous.assignments);

    let changes = ComparisonChanges {
        customers_percent: percent_change(now.customers as f64, before.customers as f64),
        recommendations_percent: percent_change(
            now.recommendations as f64,
            before.recommendations as f64,
        ),
        revenue_percent: percent_change(now.revenue, before.revenue),
        acceptance_prob_percent: percent_change(now.avg_acceptance_prob, before.avg_acceptance_prob),
        cluster_stability_percent: stability,
    };

    let mut warnings = Vec::new();
    if stability < LOW_STABILITY_PERCENT {
        warnings.push(format!(
            "Low cluster stability ({stability:.1}%). Significant customer movement detected."
        ));
    }
    let drift = changes.customers_percent.unwrap_or(0.0).abs();
    if drift > CUSTOMER_DRIFT_PERCENT {
        warnings.push(format!(
            "Customer count changed by {drift:.1}%. Verify data consistency."
        ));
    }

    log::debug!(
        "compared run {} against {}: stability {stability:.1}%, {} warning(s)",
        current.run_id,
        previous.run_id,
        warnings.len()
    );

    Comparison {
        current_run_id: current.run_id,
        previous_run_id: Some(previous.run_id),
        has_comparison: true,
        current: Some(now),
        previous: Some(before),
        changes,
        warnings,
        message: None,
    }
}
