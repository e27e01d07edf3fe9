use insights_core::{
    aggregator::aggregate,
    model::{ClusterSummaryEntry, Recommendation},
    persona::Persona,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn cluster(cluster_id: i64, customer_count: u64) -> ClusterSummaryEntry {
    ClusterSummaryEntry {
        cluster_id,
        customer_count,
        avg_distance: None,
    }
}

fn rec(cluster_id: Option<i64>, p: f64, revenue: f64) -> Recommendation {
    Recommendation {
        customer_id: "C001".into(),
        cluster_id,
        product_code: "CCOR602".into(),
        acceptance_probability: p,
        expected_revenue: revenue,
        ..Recommendation::default()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Revenue and mean probability are accumulated per cluster, and the result
/// follows the order of the cluster summary, not of the recommendations.
#[test]
fn aggregates_per_cluster_in_summary_order() {
    let clusters = vec![cluster(2, 40), cluster(0, 100)];
    let recs = vec![
        rec(Some(0), 0.8, 100.0),
        rec(Some(2), 0.4, 50.0),
        rec(Some(0), 0.6, 300.0),
    ];

    let stats = aggregate(&clusters, &recs);

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].cluster_id, 2);
    assert_eq!(stats[0].persona, Persona::TheFoundation);
    assert_eq!(stats[0].recommendation_count, 1);
    assert!((stats[0].total_revenue - 50.0).abs() < 1e-9);

    assert_eq!(stats[1].cluster_id, 0);
    assert_eq!(stats[1].persona, Persona::SilverSavers);
    assert_eq!(stats[1].customer_count, 100);
    assert_eq!(stats[1].recommendation_count, 2);
    assert!((stats[1].total_revenue - 400.0).abs() < 1e-9);
    assert!((stats[1].mean_acceptance_probability - 0.7).abs() < 1e-9);
}

/// A cluster with no recommendations reports zeros, never NaN.
#[test]
fn cluster_without_recommendations_is_zeroed() {
    let stats = aggregate(&[cluster(3, 10)], &[rec(Some(1), 0.9, 10.0)]);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].recommendation_count, 0);
    assert_eq!(stats[0].total_revenue, 0.0);
    assert_eq!(stats[0].mean_acceptance_probability, 0.0);
}

/// No clusters means no stats, whatever the recommendations say.
#[test]
fn empty_cluster_list_yields_empty_result() {
    assert!(aggregate(&[], &[rec(Some(0), 0.9, 10.0)]).is_empty());
    assert!(aggregate(&[], &[]).is_empty());
}

/// Recommendations with no cluster or an unlisted cluster are left out.
#[test]
fn unmatched_recommendations_are_ignored() {
    let recs = vec![rec(None, 0.9, 500.0), rec(Some(9), 0.9, 500.0), rec(Some(0), 0.5, 20.0)];
    let stats = aggregate(&[cluster(0, 5)], &recs);
    assert_eq!(stats[0].recommendation_count, 1);
    assert!((stats[0].total_revenue - 20.0).abs() < 1e-9);
}

/// Unregistered cluster ids still aggregate, under the default persona.
#[test]
fn unregistered_cluster_gets_default_persona() {
    let stats = aggregate(&[cluster(7, 3)], &[rec(Some(7), 0.3, 1.0)]);
    assert_eq!(stats[0].persona, Persona::EssentialUsers);
    assert_eq!(stats[0].recommendation_count, 1);
}

/// Out-of-range inputs are not rejected; they flow through the arithmetic.
#[test]
fn out_of_range_values_propagate() {
    let stats = aggregate(&[cluster(1, 2)], &[rec(Some(1), 1.5, -40.0)]);
    assert!((stats[0].mean_acceptance_probability - 1.5).abs() < 1e-9);
    assert!((stats[0].total_revenue + 40.0).abs() < 1e-9);
}
