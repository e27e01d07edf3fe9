//! Seeded synthetic segmentation runs.
//!
//! RULE: same seed + same shape = identical dataset.
//! Used to populate demo stores and to drive the property tests. Each
//! concern draws from its own RNG stream, so changing how many
//! recommendations a customer gets never changes who the customers are.

use crate::{
    error::InsightsResult,
    model::{ClusterAssignment, Recommendation, RecommendationStatus, Run, RunStatus},
    name_generator::NameGenerator,
    rng::{RngBank, Stream, StreamRng},
    snapshot::RunSnapshot,
    store::InsightsStore,
    summary::build_summary,
    types::{ClusterId, CustomerId, RunId},
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Product codes handed out by the generator.
pub const DEMO_PRODUCTS: &[&str] = &[
    "CCOR602", "CACR432", "CADB439", "CINV819", "CRDT356", "DPAM682", "DPAM234", "MORTGAGE",
    "QUICKCASH", "REWARDS_CREDIT",
];

const PROFESSIONS: &[&str] = &[
    "Engineer", "Architect", "Nurse", "Retired", "Student", "Entrepreneur", "Accountant",
    "Designer", "Driver", "Consultant",
];

const MAX_RECS_PER_CUSTOMER: u64 = 3;

/// Shape of a generated run.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSpec {
    pub customers: usize,
    /// Number of clusters; ids are `0..clusters`.
    pub clusters: u64,
    /// Share of customers whose stored name is a raw CSV row.
    pub csv_name_share: f64,
    /// Share of customers left without a cluster assignment.
    pub unassigned_share: f64,
}

impl Default for DatasetSpec {
    fn default() -> Self {
        Self {
            customers: 200,
            clusters: 5,
            csv_name_share: 0.3,
            unassigned_share: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCustomer {
    pub customer_id: CustomerId,
    /// Raw stored name (plain or CSV row).
    pub name: String,
    pub annual_income: f64,
    pub profession: &'static str,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyntheticDataset {
    pub customers: Vec<SyntheticCustomer>,
    pub assignments: Vec<ClusterAssignment>,
    pub recommendations: Vec<Recommendation>,
}

impl SyntheticDataset {
    /// In-memory snapshot of this dataset as a finished, successful run.
    pub fn snapshot(&self, run_id: RunId) -> RunSnapshot {
        let summary = build_summary(run_id, &self.assignments, &self.recommendations);
        let run = Run {
            run_id,
            status: RunStatus::Success,
            customers_processed: Some(self.customers.len() as u64),
            clusters_count: Some(summary.clusters.len() as u64),
            ..Run::default()
        };
        RunSnapshot::new(run, summary, self.recommendations.clone())
    }
}

pub fn generate(seed: u64, spec: &DatasetSpec) -> SyntheticDataset {
    let bank = RngBank::new(seed);
    let mut people = bank.stream(Stream::Customers);
    let mut clustering = bank.stream(Stream::Clusters);
    let mut affinity_rng = bank.stream(Stream::Affinity);
    let mut recs_rng = bank.stream(Stream::Recommendations);

    let affinity = affinity_table(&mut affinity_rng, spec.clusters);
    let mut dataset = SyntheticDataset::default();
    let mut next_id = 1;

    for i in 0..spec.customers {
        let customer_id = format!("C{:04}", i + 1);
        let name = if people.chance(spec.csv_name_share) {
            NameGenerator::csv_row(&mut people, &customer_id)
        } else {
            NameGenerator::full_name(&mut people)
        };
        let annual_income = (people.range_f64(12_000.0, 180_000.0) / 100.0).round() * 100.0;
        let profession = *people.pick(PROFESSIONS);

        let cluster_id = if spec.clusters == 0 || clustering.chance(spec.unassigned_share) {
            None
        } else {
            Some(clustering.below(spec.clusters) as ClusterId)
        };
        if let Some(cluster_id) = cluster_id {
            dataset.assignments.push(ClusterAssignment {
                customer_id: customer_id.clone(),
                cluster_id,
                distance_to_centroid: Some(clustering.range_f64(0.05, 2.5)),
            });
        }

        let rec_count = 1 + recs_rng.below(MAX_RECS_PER_CUSTOMER);
        let mut offered: HashSet<usize> = HashSet::new();
        while (offered.len() as u64) < rec_count {
            let product = recs_rng.below(DEMO_PRODUCTS.len() as u64) as usize;
            if !offered.insert(product) {
                continue;
            }
            let base = cluster_id
                .and_then(|c| affinity.get(c as usize))
                .map(|row| row[product])
                .unwrap_or(0.5);
            let p = (base + recs_rng.range_f64(-0.1, 0.1)).clamp(0.01, 0.99);
            let revenue = (annual_income * recs_rng.range_f64(0.002, 0.02)).round();
            dataset.recommendations.push(Recommendation {
                id: next_id,
                customer_id: customer_id.clone(),
                customer_name: Some(name.clone()),
                cluster_id,
                product_code: DEMO_PRODUCTS[product].to_string(),
                acceptance_probability: p,
                expected_revenue: revenue,
                customer_income: Some(annual_income),
                status: RecommendationStatus::Pending,
            });
            next_id += 1;
        }

        dataset.customers.push(SyntheticCustomer {
            customer_id,
            name,
            annual_income,
            profession,
        });
    }

    dataset
}

/// Per-(cluster, product) base acceptance probability in [0.3, 0.95).
fn affinity_table(rng: &mut StreamRng, clusters: u64) -> Vec<Vec<f64>> {
    (0..clusters)
        .map(|_| DEMO_PRODUCTS.iter().map(|_| rng.range_f64(0.3, 0.95)).collect())
        .collect()
}

/// Generate a dataset and write it to `store` as one successful run.
pub fn seed_store(
    store: &InsightsStore,
    seed: u64,
    spec: &DatasetSpec,
    started_at: DateTime<Utc>,
) -> InsightsResult<RunId> {
    let dataset = generate(seed, spec);
    let run_id = store.insert_run(started_at)?;

    for c in &dataset.customers {
        store.upsert_customer(
            &c.customer_id,
            Some(&c.name),
            Some(c.annual_income),
            Some(c.profession),
        )?;
    }
    for a in &dataset.assignments {
        store.assign_cluster(run_id, &a.customer_id, a.cluster_id, a.distance_to_centroid)?;
    }
    for r in &dataset.recommendations {
        store.insert_recommendation(
            run_id,
            &r.customer_id,
            &r.product_code,
            r.acceptance_probability,
            r.expected_revenue,
        )?;
    }

    let clusters: HashSet<ClusterId> = dataset.assignments.iter().map(|a| a.cluster_id).collect();
    store.finish_run(
        run_id,
        RunStatus::Success,
        started_at + Duration::minutes(3),
        dataset.customers.len() as u64,
        clusters.len() as u64,
    )?;
    log::info!(
        "seeded run {run_id}: {} customers, {} recommendations (seed {seed})",
        dataset.customers.len(),
        dataset.recommendations.len()
    );
    Ok(run_id)
}
