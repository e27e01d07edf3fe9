use super::InsightsStore;
use crate::{
    error::InsightsResult,
    model::{Recommendation, RecommendationStatus},
    types::{RecommendationId, RunId},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

const RECOMMENDATION_COLUMNS: &str = "
    SELECT r.id, r.customer_id, c.name, cc.cluster_id, r.product_code,
           r.acceptance_prob, r.expected_revenue, c.annual_income, r.status
    FROM recommendations r
    LEFT JOIN customers c ON c.customer_id = r.customer_id
    LEFT JOIN customer_clusters cc
           ON cc.customer_id = r.customer_id AND cc.run_id = r.run_id";

impl InsightsStore {
pub fn insert_recommendation(
    &self,
    run_id: RunId,
    customer_id: &str,
    product_code: &str,
    acceptance_prob: f64,
    expected_revenue: f64,
) -> InsightsResult<RecommendationId> {
    self.conn.execute(
        "INSERT INTO recommendations (
            run_id, customer_id, product_code, acceptance_prob, expected_revenue, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending')",
        params![run_id, customer_id, product_code, acceptance_prob, expected_revenue],
    )?;
    Ok(self.conn.last_insert_rowid())
}

pub fn recommendation_count(&self, run_id: RunId) -> InsightsResult<u64> {
    let count: i64 = self.conn.query_row(
        "SELECT COUNT(*) FROM recommendations WHERE run_id = ?1",
        params![run_id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// One page of a run's recommendations, most likely to be accepted first.
pub fn recommendations(
    &self,
    run_id: RunId,
    limit: usize,
    offset: usize,
) -> InsightsResult<Vec<Recommendation>> {
    let sql = format!(
        "{RECOMMENDATION_COLUMNS}
         WHERE r.run_id = ?1
         ORDER BY r.acceptance_prob DESC, r.id ASC
         LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = self.conn.prepare(&sql)?;
    let recs = stmt
        .query_map(params![run_id, limit as i64, offset as i64], recommendation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recs)
}

/// Every recommendation of a run, in insertion order.
pub fn all_recommendations(&self, run_id: RunId) -> InsightsResult<Vec<Recommendation>> {
    let sql = format!("{RECOMMENDATION_COLUMNS} WHERE r.run_id = ?1 ORDER BY r.id ASC");
    let mut stmt = self.conn.prepare(&sql)?;
    let recs = stmt
        .query_map(params![run_id], recommendation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recs)
}

/// Move a pending recommendation to `sent` or `dismissed`.
/// Returns false when the row is missing, not pending, or the target
/// status is `pending`.
pub fn set_recommendation_status(
    &self,
    recommendation_id: RecommendationId,
    status: RecommendationStatus,
    at: DateTime<Utc>,
) -> InsightsResult<bool> {
    let column = match status {
        RecommendationStatus::Pending => return Ok(false),
        RecommendationStatus::Sent => "sent_at",
        RecommendationStatus::Dismissed => "dismissed_at",
    };
    let updated = self.conn.execute(
        &format!(
            "UPDATE recommendations SET status = ?1, {column} = ?2
             WHERE id = ?3 AND status = 'pending'"
        ),
        params![status.as_str(), at.to_rfc3339(), recommendation_id],
    )?;
    if updated == 0 {
        log::warn!(
            "recommendation {recommendation_id}: transition to {} rejected",
            status.as_str()
        );
    }
    Ok(updated > 0)
}
}

fn recommendation_from_row(row: &Row<'_>) -> rusqlite::Result<Recommendation> {
    Ok(Recommendation {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        cluster_id: row.get(3)?,
        product_code: row.get(4)?,
        acceptance_probability: row.get(5)?,
        expected_revenue: row.get(6)?,
        customer_income: row.get(7)?,
        status: RecommendationStatus::from(row.get::<_, String>(8)?),
    })
}
