//! Headline dashboard figures derived from a cluster summary.

use crate::{model::ClusterSummary, types::ClusterId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyGoal {
    pub current: u64,
    pub target: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardKpis {
    pub total_customers: u64,
    pub active_clusters: usize,
    pub suggested_deals: usize,
    /// Percent of the monthly goal reached, capped at 100.
    pub goal_progress: f64,
}

pub fn dashboard_kpis(
    summary: &ClusterSummary,
    suggested_deals: usize,
    goal: MonthlyGoal,
) -> DashboardKpis {
    let goal_progress = if goal.target > 0 {
        (goal.current as f64 / goal.target as f64 * 100.0).min(100.0)
    } else {
        0.0
    };
    DashboardKpis {
        total_customers: summary.total_customers_processed,
        active_clusters: summary.clusters.len(),
        suggested_deals,
        goal_progress,
    }
}

/// Engagement score per cluster: 50 plus half the cluster's share of all
/// processed customers, rounded.
pub fn engagement_scores(summary: &ClusterSummary) -> Vec<(ClusterId, u32)> {
    let total = summary.total_customers_processed.max(1) as f64;
    summary
        .clusters
        .iter()
        .map(|c| {
            let ratio = c.customer_count as f64 / total;
            (c.cluster_id, (50.0 + ratio * 50.0).round() as u32)
        })
        .collect()
}
