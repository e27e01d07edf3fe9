//! Cluster aggregator: per-cluster revenue and probability rollups.
//!
//! Joins the run's cluster summary (customer counts) with the flat
//! recommendation list. One pass over the recommendations, then one
//! lookup per summary entry; output order follows the summary.

use crate::{
    model::{ClusterSummaryEntry, Recommendation},
    persona::Persona,
    types::ClusterId,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStat {
    pub cluster_id: ClusterId,
    pub customer_count: u64,
    pub persona: Persona,
    pub total_revenue: f64,
    pub mean_acceptance_probability: f64,
    pub recommendation_count: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ClusterAccumulator {
    revenue_sum: f64,
    probability_sum: f64,
    count: u64,
}

impl ClusterAccumulator {
    fn add(&mut self, rec: &Recommendation) {
        self.revenue_sum += rec.expected_revenue;
        self.probability_sum += rec.acceptance_probability;
        self.count += 1;
    }

    fn mean_probability(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.probability_sum / self.count as f64
        }
    }
}

pub fn aggregate(
    clusters: &[ClusterSummaryEntry],
    recommendations: &[Recommendation],
) -> Vec<ClusterStat> {
    if clusters.is_empty() {
        return Vec::new();
    }

    let mut accumulators: HashMap<ClusterId, ClusterAccumulator> = HashMap::new();
    for rec in recommendations {
        // Recommendations without a cluster cannot match any summary entry.
        if let Some(cluster_id) = rec.cluster_id {
            accumulators.entry(cluster_id).or_default().add(rec);
        }
    }

    let stats: Vec<ClusterStat> = clusters
        .iter()
        .map(|entry| {
            let acc = accumulators.get(&entry.cluster_id).copied().unwrap_or_default();
            ClusterStat {
                cluster_id: entry.cluster_id,
                customer_count: entry.customer_count,
                persona: Persona::for_cluster(entry.cluster_id),
                total_revenue: acc.revenue_sum,
                mean_acceptance_probability: acc.mean_probability(),
                recommendation_count: acc.count,
            }
        })
        .collect();

    log::debug!(
        "aggregated {} clusters from {} recommendations",
        stats.len(),
        recommendations.len()
    );
    stats
}
