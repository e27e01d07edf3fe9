use super::InsightsStore;
use crate::{error::InsightsResult, model::ClusterAssignment, types::{ClusterId, RunId}};
use rusqlite::params;

impl InsightsStore {
    /// Insert or refresh a customer's master data. `name` is stored raw.
    pub fn upsert_customer(
        &self,
        customer_id: &str,
        name: Option<&str>,
        annual_income: Option<f64>,
        profession: Option<&str>,
    ) -> InsightsResult<()> {
        self.conn.execute(
            "INSERT INTO customers (customer_id, name, annual_income, profession)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (customer_id) DO UPDATE SET
                name = excluded.name,
                annual_income = excluded.annual_income,
                profession = excluded.profession",
            params![customer_id, name, annual_income, profession],
        )?;
        Ok(())
    }

    pub fn assign_cluster(
        &self,
        run_id: RunId,
        customer_id: &str,
        cluster_id: ClusterId,
        distance_to_centroid: Option<f64>,
    ) -> InsightsResult<()> {
        self.conn.execute(
            "INSERT INTO customer_clusters (run_id, customer_id, cluster_id, distance_to_centroid)
             VALUES (?1, ?2, ?3, ?4)",
            params![run_id, customer_id, cluster_id, distance_to_centroid],
        )?;
        Ok(())
    }

    pub fn cluster_assignments(&self, run_id: RunId) -> InsightsResult<Vec<ClusterAssignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, cluster_id, distance_to_centroid
             FROM customer_clusters
             WHERE run_id = ?1
             ORDER BY customer_id ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(ClusterAssignment {
                    customer_id: row.get(0)?,
                    cluster_id: row.get(1)?,
                    distance_to_centroid: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
