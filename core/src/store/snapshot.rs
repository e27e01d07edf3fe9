use super::InsightsStore;
use crate::{
    comparison::{compare, RunData},
    error::InsightsResult,
    snapshot::RunSnapshot,
    summary::build_summary,
    types::RunId,
};

impl InsightsStore {
    /// Assemble the input snapshot for one run.
    ///
    /// The summary and comparison cover every recommendation of the run;
    /// the snapshot's recommendation list is capped at `limit`, highest
    /// acceptance probability first.
    pub fn load_snapshot(&self, run_id: RunId, limit: usize) -> InsightsResult<RunSnapshot> {
        let run = self.run(run_id)?;
        let assignments = self.cluster_assignments(run_id)?;
        let all_recs = self.all_recommendations(run_id)?;
        let summary = build_summary(run_id, &assignments, &all_recs);

        let current = RunData {
            run_id,
            assignments: &assignments,
            recommendations: &all_recs,
        };
        let comparison = match self.previous_successful_run(run_id)? {
            Some(prev) => {
                let prev_assignments = self.cluster_assignments(prev.run_id)?;
                let prev_recs = self.all_recommendations(prev.run_id)?;
                let previous = RunData {
                    run_id: prev.run_id,
                    assignments: &prev_assignments,
                    recommendations: &prev_recs,
                };
                compare(&current, Some(&previous))
            }
            None => compare(&current, None),
        };

        let recommendations = self.recommendations(run_id, limit, 0)?;
        log::info!(
            "loaded snapshot for run {run_id}: {} clusters, {} of {} recommendations",
            summary.clusters.len(),
            recommendations.len(),
            all_recs.len()
        );
        Ok(RunSnapshot::new(run, summary, recommendations).with_comparison(comparison))
    }
}
