use crate::error::{InsightsError, InsightsResult};
use serde::{Deserialize, Serialize};

// ── Opportunity scoring ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Mean acceptance probability a (cluster, product) bucket must
    /// strictly exceed before it is offered as an opportunity.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,
    /// Maximum number of ranked opportunities returned.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            top_n: default_top_n(),
        }
    }
}

fn default_acceptance_threshold() -> f64 {
    crate::opportunity::DEFAULT_ACCEPTANCE_THRESHOLD
}

fn default_top_n() -> usize {
    crate::opportunity::DEFAULT_TOP_N
}

// ── Run-list polling ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: default_interval_secs() }
    }
}

fn default_interval_secs() -> u64 {
    5
}

// ── Snapshot store ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// How many recommendations are pulled into one run snapshot.
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,
    /// How many runs the run list shows, newest first.
    #[serde(default = "default_run_list_limit")]
    pub run_list_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            recommendation_limit: default_recommendation_limit(),
            run_list_limit: default_run_list_limit(),
        }
    }
}

fn default_recommendation_limit() -> usize {
    100
}

fn default_run_list_limit() -> usize {
    20
}

// ── Top level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InsightsConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl InsightsConfig {
    /// Load from the data/ directory.
    /// In tests, use InsightsConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/insights/insights.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json(&content)?;
        log::debug!("Loaded insights config from {path}");
        Ok(config)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(content: &str) -> InsightsResult<Self> {
        let config: InsightsConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> InsightsResult<()> {
        let threshold = self.scoring.acceptance_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(invalid(format!(
                "scoring.acceptance_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.scoring.top_n == 0 {
            return Err(invalid("scoring.top_n must be at least 1".into()));
        }
        if self.polling.interval_secs == 0 {
            return Err(invalid("polling.interval_secs must be at least 1".into()));
        }
        if self.store.recommendation_limit == 0 || self.store.run_list_limit == 0 {
            return Err(invalid("store limits must be at least 1".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.polling.interval_secs)
    }
}

fn invalid(reason: String) -> InsightsError {
    InsightsError::InvalidConfig { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = InsightsConfig::from_json("{}").unwrap();
        assert_eq!(config, InsightsConfig::default_test());
        assert_eq!(config.scoring.acceptance_threshold, 0.6);
        assert_eq!(config.scoring.top_n, 10);
        assert_eq!(config.polling.interval_secs, 5);
        assert_eq!(config.store.recommendation_limit, 100);
        assert_eq!(config.store.run_list_limit, 20);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config =
            InsightsConfig::from_json(r#"{"scoring": {"top_n": 3}, "polling": {"interval_secs": 1}}"#)
                .unwrap();
        assert_eq!(config.scoring.top_n, 3);
        assert_eq!(config.scoring.acceptance_threshold, 0.6);
        assert_eq!(config.polling.interval_secs, 1);
    }

    #[test]
    fn shipped_config_loads() {
        let config = InsightsConfig::load("../data").unwrap();
        assert_eq!(config, InsightsConfig::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for doc in [
            r#"{"scoring": {"acceptance_threshold": 1.5}}"#,
            r#"{"scoring": {"top_n": 0}}"#,
            r#"{"polling": {"interval_secs": 0}}"#,
            r#"{"store": {"recommendation_limit": 0}}"#,
        ] {
            let err = InsightsConfig::from_json(doc).unwrap_err();
            assert!(
                matches!(err, InsightsError::InvalidConfig { .. }),
                "expected InvalidConfig for {doc}, got {err:?}"
            );
        }
    }
}
