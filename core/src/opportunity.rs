//! Opportunity scorer: the next-best-action engine.
//!
//! Groups recommendations by (cluster, product), measures how much of the
//! cluster already holds the product, and ranks the remaining headroom.
//!
//! Ranking heuristics (pending product-owner confirmation):
//!   - a bucket qualifies only when its mean acceptance probability is
//!     strictly above the threshold (0.6 by default)
//!   - priority = mean_probability × opportunity_count
//!   - potential_revenue = mean_probability × mean_revenue × opportunity_count

use crate::{
    config::ScoringConfig,
    model::{ClusterSummaryEntry, Recommendation},
    persona::Persona,
    types::{ClusterId, CustomerId},
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_TOP_N: usize = 10;

// ── Grouping ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductGroupKey {
    pub cluster_id: ClusterId,
    pub product_code: String,
}

/// Accumulated recommendations for one (cluster, product) bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductGroupStat {
    pub key: ProductGroupKey,
    pub count: u64,
    pub total_revenue: f64,
    pub total_probability: f64,
    pub customers: HashSet<CustomerId>,
}

impl ProductGroupStat {
    fn new(key: ProductGroupKey) -> Self {
        Self {
            key,
            count: 0,
            total_revenue: 0.0,
            total_probability: 0.0,
            customers: HashSet::new(),
        }
    }

    fn add(&mut self, rec: &Recommendation) {
        self.count += 1;
        self.total_revenue += rec.expected_revenue;
        self.total_probability += rec.acceptance_probability;
        if !rec.customer_id.is_empty() {
            self.customers.insert(rec.customer_id.clone());
        }
    }

    /// Divided on read; buckets always hold at least one record.
    pub fn mean_probability(&self) -> f64 {
        self.total_probability / self.count as f64
    }

    pub fn mean_revenue(&self) -> f64 {
        self.total_revenue / self.count as f64
    }

    pub fn ownership_count(&self) -> u64 {
        self.customers.len() as u64
    }
}

/// Buckets in first-encountered order, indexed by key and by cluster.
#[derive(Debug, Default)]
pub struct ProductGroups {
    buckets: Vec<ProductGroupStat>,
    index: HashMap<ProductGroupKey, usize>,
    by_cluster: HashMap<ClusterId, Vec<usize>>,
}

impl ProductGroups {
    /// Single pass over the recommendations. Records with no cluster or no
    /// product code cannot be attributed to a bucket and are skipped.
    pub fn collect(recommendations: &[Recommendation]) -> Self {
        let mut groups = Self::default();
        for rec in recommendations {
            let Some(cluster_id) = rec.cluster_id else {
                continue;
            };
            if rec.product_code.is_empty() {
                continue;
            }
            let key = ProductGroupKey {
                cluster_id,
                product_code: rec.product_code.clone(),
            };
            let slot = match groups.index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = groups.buckets.len();
                    groups.buckets.push(ProductGroupStat::new(key.clone()));
                    groups.index.insert(key, slot);
                    groups.by_cluster.entry(cluster_id).or_default().push(slot);
                    slot
                }
            };
            groups.buckets[slot].add(rec);
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, cluster_id: ClusterId, product_code: &str) -> Option<&ProductGroupStat> {
        let key = ProductGroupKey {
            cluster_id,
            product_code: product_code.to_string(),
        };
        self.index.get(&key).map(|&slot| &self.buckets[slot])
    }

    /// Buckets of one cluster, in the order they were first seen.
    pub fn for_cluster(&self, cluster_id: ClusterId) -> impl Iterator<Item = &ProductGroupStat> {
        self.by_cluster
            .get(&cluster_id)
            .map(|slots| slots.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&slot| &self.buckets[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductGroupStat> {
        self.buckets.iter()
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityCandidate {
    pub cluster_id: ClusterId,
    pub persona_name: &'static str,
    pub product_code: String,
    pub opportunity_count: u64,
    pub potential_revenue: f64,
    pub acceptance_rate: f64,
    pub current_ownership_percent: f64,
    pub priority: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpportunityScorer {
    pub threshold: f64,
    pub top_n: usize,
}

impl Default for OpportunityScorer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl OpportunityScorer {
    pub fn new(threshold: f64, top_n: usize) -> Self {
        Self { threshold, top_n }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.acceptance_threshold, config.top_n)
    }

    pub fn score(
        &self,
        clusters: &[ClusterSummaryEntry],
        recommendations: &[Recommendation],
    ) -> Vec<OpportunityCandidate> {
        if recommendations.is_empty() || clusters.is_empty() {
            return Vec::new();
        }
        let groups = ProductGroups::collect(recommendations);
        self.rank(clusters, &groups)
    }

    /// Rank pre-grouped buckets against the cluster sizes.
    pub fn rank(
        &self,
        clusters: &[ClusterSummaryEntry],
        groups: &ProductGroups,
    ) -> Vec<OpportunityCandidate> {
        let mut candidates = Vec::new();

        for cluster in clusters.iter().filter(|c| c.customer_count > 0) {
            let persona = Persona::for_cluster(cluster.cluster_id);
            for bucket in groups.for_cluster(cluster.cluster_id) {
                if let Some(candidate) = self.evaluate(cluster, persona, bucket) {
                    candidates.push(candidate);
                }
            }
        }

        // Stable: equal priorities keep bucket encounter order.
        candidates.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
        candidates.truncate(self.top_n);

        log::debug!(
            "scored {} buckets into {} opportunities (threshold {}, top {})",
            groups.len(),
            candidates.len(),
            self.threshold,
            self.top_n
        );
        candidates
    }

    fn evaluate(
        &self,
        cluster: &ClusterSummaryEntry,
        persona: Persona,
        bucket: &ProductGroupStat,
    ) -> Option<OpportunityCandidate> {
        let customer_count = cluster.customer_count as i64;
        let ownership = bucket.ownership_count() as i64;
        let opportunity = customer_count - ownership;
        if opportunity <= 0 {
            return None;
        }

        let mean_probability = bucket.mean_probability();
        if mean_probability.partial_cmp(&self.threshold) != Some(Ordering::Greater) {
            return None;
        }

        let opportunity_count = opportunity as u64;
        Some(OpportunityCandidate {
            cluster_id: cluster.cluster_id,
            persona_name: persona.name(),
            product_code: bucket.key.product_code.clone(),
            opportunity_count,
            potential_revenue: mean_probability * bucket.mean_revenue() * opportunity_count as f64,
            acceptance_rate: mean_probability,
            current_ownership_percent: 100.0 * ownership as f64 / customer_count as f64,
            priority: mean_probability * opportunity_count as f64,
        })
    }
}

/// Score with explicit threshold and list length.
pub fn score(
    clusters: &[ClusterSummaryEntry],
    recommendations: &[Recommendation],
    threshold: f64,
    top_n: usize,
) -> Vec<OpportunityCandidate> {
    OpportunityScorer::new(threshold, top_n).score(clusters, recommendations)
}
