//! Builds the per-run cluster summary from raw cluster assignments and
//! recommendations.

use crate::{
    model::{ClusterAssignment, ClusterSummary, ClusterSummaryEntry, ProductSummary, Recommendation},
    types::{ClusterId, RunId},
};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const NO_CLUSTERS_WARNING: &str =
    "No clusters found for this batch run. The clustering may not have completed successfully.";
pub const NO_RECOMMENDATIONS_WARNING: &str =
    "No recommendations found for this batch run. Service assignment may not have completed.";

#[derive(Default)]
struct ClusterTally {
    customers: u64,
    distance_sum: f64,
    distance_count: u64,
}

#[derive(Default)]
struct ProductTally {
    count: u64,
    revenue: f64,
    probability_sum: f64,
    min_probability: f64,
    max_probability: f64,
}

impl ProductTally {
    fn add(&mut self, p: f64, revenue: f64) {
        if self.count == 0 {
            self.min_probability = p;
            self.max_probability = p;
        } else {
            self.min_probability = self.min_probability.min(p);
            self.max_probability = self.max_probability.max(p);
        }
        self.count += 1;
        self.revenue += revenue;
        self.probability_sum += p;
    }
}

pub fn build_summary(
    run_id: RunId,
    assignments: &[ClusterAssignment],
    recommendations: &[Recommendation],
) -> ClusterSummary {
    let mut tallies: BTreeMap<ClusterId, ClusterTally> = BTreeMap::new();
    let mut distinct_customers: HashSet<&str> = HashSet::new();
    for a in assignments {
        let tally = tallies.entry(a.cluster_id).or_default();
        tally.customers += 1;
        if let Some(d) = a.distance_to_centroid {
            tally.distance_sum += d;
            tally.distance_count += 1;
        }
        distinct_customers.insert(a.customer_id.as_str());
    }

    let clusters: Vec<ClusterSummaryEntry> = tallies
        .into_iter()
        .map(|(cluster_id, t)| ClusterSummaryEntry {
            cluster_id,
            customer_count: t.customers,
            avg_distance: (t.distance_count > 0).then(|| t.distance_sum / t.distance_count as f64),
        })
        .collect();

    let total_expected_revenue: f64 = recommendations.iter().map(|r| r.expected_revenue).sum();
    let avg_acceptance_probability = if recommendations.is_empty() {
        0.0
    } else {
        recommendations.iter().map(|r| r.acceptance_probability).sum::<f64>()
            / recommendations.len() as f64
    };

    let products = product_rollup(recommendations);

    let mut warnings = Vec::new();
    if clusters.is_empty() {
        warnings.push(NO_CLUSTERS_WARNING.to_string());
    }
    if recommendations.is_empty() {
        warnings.push(NO_RECOMMENDATIONS_WARNING.to_string());
    }
    if !warnings.is_empty() {
        log::warn!("run {run_id} summary: {}", warnings.join(" "));
    }

    ClusterSummary {
        run_id,
        clusters,
        total_customers_processed: distinct_customers.len() as u64,
        total_recommendations: recommendations.len() as u64,
        total_expected_revenue,
        avg_acceptance_probability,
        products,
        warnings,
    }
}

/// Per-product rollup ordered by total revenue, highest first.
pub fn product_rollup(recommendations: &[Recommendation]) -> Vec<ProductSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, ProductTally> = HashMap::new();
    for rec in recommendations {
        let code = rec.product_code.as_str();
        tallies
            .entry(code)
            .or_insert_with(|| {
                order.push(code);
                ProductTally::default()
            })
            .add(rec.acceptance_probability, rec.expected_revenue);
    }

    let mut products: Vec<ProductSummary> = order
        .into_iter()
        .filter_map(|code| {
            tallies.get(code).map(|t| ProductSummary {
                product_code: code.to_string(),
                recommendation_count: t.count,
                avg_acceptance_probability: t.probability_sum / t.count as f64,
                total_expected_revenue: t.revenue,
                min_acceptance_probability: t.min_probability,
                max_acceptance_probability: t.max_probability,
            })
        })
        .collect();
    products.sort_by(|a, b| {
        b.total_expected_revenue
            .partial_cmp(&a.total_expected_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    products
}
