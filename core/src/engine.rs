//! The insights engine: derived views over one selected run snapshot.
//!
//! RULES:
//!   - The snapshot is immutable once selected.
//!   - Every view is a pure function of the snapshot (and, for the
//!     recommendation list, of the query and sort key).
//!   - Views are memoised per selection; `select()` drops them. A cached
//!     view is always identical to a fresh recomputation.

use crate::{
    aggregator::{aggregate, ClusterStat},
    config::InsightsConfig,
    filter::{filter_sort_indices, SortKey},
    kpi::{dashboard_kpis, DashboardKpis, MonthlyGoal},
    model::{Recommendation, RecommendationStatus},
    opportunity::{OpportunityCandidate, OpportunityScorer},
    snapshot::RunSnapshot,
};
use serde::Serialize;

#[derive(Debug, Default)]
struct ViewCache {
    cluster_stats: Option<Vec<ClusterStat>>,
    opportunities: Option<Vec<OpportunityCandidate>>,
    listing: Option<Listing>,
}

#[derive(Debug)]
struct Listing {
    query: String,
    sort_key: Option<SortKey>,
    positions: Vec<usize>,
}

/// All derived views of a snapshot, owned, for export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsView {
    pub cluster_stats: Vec<ClusterStat>,
    pub opportunities: Vec<OpportunityCandidate>,
    pub recommendations: Vec<Recommendation>,
}

pub struct InsightsEngine {
    config: InsightsConfig,
    snapshot: Option<RunSnapshot>,
    cache: ViewCache,
}

impl InsightsEngine {
    pub fn new(config: InsightsConfig) -> Self {
        Self {
            config,
            snapshot: None,
            cache: ViewCache::default(),
        }
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    pub fn scorer(&self) -> OpportunityScorer {
        OpportunityScorer::from_config(&self.config.scoring)
    }

    /// Replace the selected snapshot. Previously derived views are discarded.
    pub fn select(&mut self, snapshot: RunSnapshot) {
        log::info!(
            "selected run {} ({} clusters, {} recommendations)",
            snapshot.run.run_id,
            snapshot.summary.clusters.len(),
            snapshot.recommendations.len()
        );
        self.snapshot = Some(snapshot);
        self.cache = ViewCache::default();
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        self.cache = ViewCache::default();
    }

    pub fn snapshot(&self) -> Option<&RunSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn cluster_stats(&mut self) -> &[ClusterStat] {
        let snapshot = self.snapshot.as_ref();
        self.cache.cluster_stats.get_or_insert_with(|| match snapshot {
            Some(s) => aggregate(&s.summary.clusters, &s.recommendations),
            None => Vec::new(),
        })
    }

    pub fn opportunities(&mut self) -> &[OpportunityCandidate] {
        let snapshot = self.snapshot.as_ref();
        let scorer = OpportunityScorer::from_config(&self.config.scoring);
        self.cache.opportunities.get_or_insert_with(|| match snapshot {
            Some(s) => scorer.score(&s.summary.clusters, &s.recommendations),
            None => Vec::new(),
        })
    }

    /// Filtered and sorted recommendation list. The last (query, sort)
    /// combination is memoised.
    pub fn recommendations(&mut self, query: &str, sort_key: Option<SortKey>) -> Vec<&Recommendation> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };
        let stale = self
            .cache
            .listing
            .as_ref()
            .map_or(true, |l| l.query != query || l.sort_key != sort_key);
        if stale {
            self.cache.listing = Some(Listing {
                query: query.to_string(),
                sort_key,
                positions: filter_sort_indices(&snapshot.recommendations, query, sort_key),
            });
        }
        self.cache
            .listing
            .as_ref()
            .map(|l| l.positions.iter().map(|&i| &snapshot.recommendations[i]).collect())
            .unwrap_or_default()
    }

    /// Pending recommendations count as suggested deals; the goal tracks
    /// total recommendations produced by the run.
    pub fn kpis(&self, goal_target: u64) -> DashboardKpis {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return dashboard_kpis(&Default::default(), 0, MonthlyGoal { current: 0, target: goal_target });
        };
        let pending = snapshot
            .recommendations
            .iter()
            .filter(|r| r.status == RecommendationStatus::Pending)
            .count();
        let goal = MonthlyGoal {
            current: snapshot.summary.total_recommendations,
            target: goal_target,
        };
        dashboard_kpis(&snapshot.summary, pending, goal)
    }

    pub fn view(&mut self, query: &str, sort_key: Option<SortKey>) -> InsightsView {
        let cluster_stats = self.cluster_stats().to_vec();
        let opportunities = self.opportunities().to_vec();
        let recommendations = self
            .recommendations(query, sort_key)
            .into_iter()
            .cloned()
            .collect();
        InsightsView {
            cluster_stats,
            opportunities,
            recommendations,
        }
    }
}
