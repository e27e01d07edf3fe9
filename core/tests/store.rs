use chrono::{Duration, TimeZone, Utc};
use insights_core::{
    dataset::{generate, seed_store, DatasetSpec},
    error::InsightsError,
    model::{RecommendationStatus, RunStatus},
    store::InsightsStore,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn make_store() -> InsightsStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = InsightsStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn small_spec() -> DatasetSpec {
    DatasetSpec {
        customers: 30,
        ..DatasetSpec::default()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Migrations can be applied twice without error.
#[test]
fn migrations_are_idempotent() {
    let store = make_store();
    store.migrate().unwrap();
    assert!(store.list_runs(10).unwrap().is_empty());
}

/// Runs are listed newest first with their notes decoded.
#[test]
fn runs_are_listed_newest_first() {
    let store = make_store();
    let t0 = Utc.with_ymd_and_hms(2025, 11, 1, 8, 0, 0).unwrap();
    let first = store.insert_run(t0).unwrap();
    let second = store.insert_run(t0 + Duration::days(1)).unwrap();
    store
        .finish_run(first, RunStatus::Success, t0 + Duration::minutes(5), 120, 5)
        .unwrap();

    let runs = store.list_runs(10).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, second);
    assert_eq!(runs[0].status, RunStatus::Running);
    assert_eq!(runs[1].run_id, first);
    assert_eq!(runs[1].status, RunStatus::Success);
    assert_eq!(runs[1].started_at, Some(t0));
    assert_eq!(runs[1].customers_processed, Some(120));
    assert_eq!(runs[1].clusters_count, Some(5));

    assert_eq!(store.list_runs(1).unwrap().len(), 1);
}

#[test]
fn missing_run_is_reported() {
    let store = make_store();
    assert!(matches!(
        store.run(99),
        Err(InsightsError::RunNotFound { run_id: 99 })
    ));
    assert!(matches!(
        store.finish_run(99, RunStatus::Failed, Utc::now(), 0, 0),
        Err(InsightsError::RunNotFound { run_id: 99 })
    ));
}

/// A seeded run round-trips: the snapshot summary matches the generated
/// dataset and recommendations carry their joined cluster and name.
#[test]
fn seeded_run_loads_as_snapshot() {
    let store = make_store();
    let spec = small_spec();
    let run_id = seed_store(&store, 42, &spec, Utc::now()).unwrap();
    let dataset = generate(42, &spec);

    let snapshot = store.load_snapshot(run_id, 1_000).unwrap();
    assert_eq!(snapshot.run.status, RunStatus::Success);
    assert_eq!(snapshot.summary.total_customers_processed, 30);
    assert_eq!(
        snapshot.summary.total_recommendations,
        dataset.recommendations.len() as u64
    );
    assert_eq!(snapshot.recommendations.len(), dataset.recommendations.len());
    assert!(snapshot.recommendations.iter().all(|r| r.cluster_id.is_some()));
    assert!(snapshot.recommendations.iter().all(|r| r.customer_name.is_some()));

    // Listing is ordered by acceptance probability, highest first.
    assert!(snapshot
        .recommendations
        .windows(2)
        .all(|w| w[0].acceptance_probability >= w[1].acceptance_probability));

    // First successful run has nothing to compare against.
    let comparison = snapshot.comparison.unwrap();
    assert!(!comparison.has_comparison);
}

/// The listing limit caps the snapshot's recommendations, not its summary.
#[test]
fn snapshot_limit_caps_listing_only() {
    let store = make_store();
    let run_id = seed_store(&store, 7, &small_spec(), Utc::now()).unwrap();
    let total = store.recommendation_count(run_id).unwrap();

    let snapshot = store.load_snapshot(run_id, 5).unwrap();
    assert_eq!(snapshot.recommendations.len(), 5);
    assert_eq!(snapshot.summary.total_recommendations, total);
}

/// A second successful run is compared against the first.
#[test]
fn second_run_compares_against_previous_success() {
    let store = make_store();
    let t0 = Utc.with_ymd_and_hms(2025, 11, 1, 8, 0, 0).unwrap();
    let first = seed_store(&store, 1, &small_spec(), t0).unwrap();
    let second = seed_store(&store, 2, &small_spec(), t0 + Duration::days(7)).unwrap();

    assert_eq!(store.previous_successful_run(second).unwrap().unwrap().run_id, first);
    assert!(store.previous_successful_run(first).unwrap().is_none());

    let comparison = store.load_snapshot(second, 10).unwrap().comparison.unwrap();
    assert!(comparison.has_comparison);
    assert_eq!(comparison.previous_run_id, Some(first));
    assert_eq!(comparison.changes.customers_percent, Some(0.0));
}

/// Only pending recommendations can move, and only once.
#[test]
fn recommendation_status_transitions() {
    let store = make_store();
    let run_id = store.insert_run(Utc::now()).unwrap();
    store.upsert_customer("C1", Some("Anna Rossi"), Some(40_000.0), None).unwrap();
    let id = store
        .insert_recommendation(run_id, "C1", "MORTGAGE", 0.8, 900.0)
        .unwrap();

    assert!(!store
        .set_recommendation_status(id, RecommendationStatus::Pending, Utc::now())
        .unwrap());
    assert!(store
        .set_recommendation_status(id, RecommendationStatus::Sent, Utc::now())
        .unwrap());
    assert!(!store
        .set_recommendation_status(id, RecommendationStatus::Dismissed, Utc::now())
        .unwrap());
    assert!(!store
        .set_recommendation_status(9_999, RecommendationStatus::Sent, Utc::now())
        .unwrap());

    let recs = store.all_recommendations(run_id).unwrap();
    assert_eq!(recs[0].status, RecommendationStatus::Sent);
    assert_eq!(recs[0].customer_name.as_deref(), Some("Anna Rossi"));
    assert_eq!(recs[0].customer_income, Some(40_000.0));
    assert_eq!(recs[0].cluster_id, None);
}

/// Re-upserting a customer refreshes its master data.
#[test]
fn upsert_customer_overwrites() {
    let store = make_store();
    let run_id = store.insert_run(Utc::now()).unwrap();
    store.upsert_customer("C1", Some("old"), None, None).unwrap();
    store.upsert_customer("C1", Some("C1,Verdi,Luca"), Some(1.0), Some("Nurse")).unwrap();
    store.assign_cluster(run_id, "C1", 3, Some(0.4)).unwrap();
    store.insert_recommendation(run_id, "C1", "X", 0.5, 1.0).unwrap();

    let recs = store.recommendations(run_id, 10, 0).unwrap();
    assert_eq!(recs[0].customer_name.as_deref(), Some("C1,Verdi,Luca"));
    assert_eq!(recs[0].cluster_id, Some(3));
    assert_eq!(store.cluster_assignments(run_id).unwrap()[0].cluster_id, 3);
}
