//! Replay module.
//!
//! A [`Scenario`] pins a configuration, seed and horizon together with the
//! trace digest the run produced when it was recorded. Replaying re-runs it
//! and fails if the digest changed; the mismatch is written to a bug report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use slowlane_config::{check_horizon, SlowlaneConfig};
use slowlane_core::stats::RunReport;
use tracing::{error, info, instrument, warn};

use crate::{ScenarioError, SimulationOutcome, Simulator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub seed: u64,
    pub horizon: f64,
    pub config: SlowlaneConfig,
    pub expected_hash: String,
}

impl Scenario {
    /// Runs `config` once and captures the resulting digest.
    pub fn record(
        config: &SlowlaneConfig,
        seed: u64,
        horizon: f64,
    ) -> Result<(Self, SimulationOutcome), ScenarioError> {
        let outcome = Simulator::from_config(config)?.run(seed, horizon)?;
        let scenario = Scenario {
            seed,
            horizon,
            config: config.clone(),
            expected_hash: outcome.trace_hash.clone(),
        };
        Ok((scenario, outcome))
    }

    /// Reads and validates a scenario file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        let scenario: Self = serde_yaml::from_str(&text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Applies the same checks as a loaded configuration, plus the horizon.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.config.check()?;
        check_horizon(self.horizon)?;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

/// What gets written when a replay does not reproduce its digest.
#[derive(Debug, Serialize)]
struct BugReport<'a> {
    scenario: &'a Scenario,
    actual_hash: &'a str,
    report: &'a RunReport,
}

/// Writes bug reports into a directory and remembers where they went.
#[derive(Debug)]
pub struct DiagnosticsCollector {
    directory: PathBuf,
    bug_reports: Vec<PathBuf>,
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DiagnosticsCollector {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            bug_reports: Vec::new(),
        }
    }

    pub fn bug_reports(&self) -> &[PathBuf] {
        &self.bug_reports
    }

    fn record_bug_report(
        &mut self,
        scenario: &Scenario,
        outcome: &SimulationOutcome,
    ) -> Result<PathBuf, ScenarioError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let path = self.directory.join(format!(
            "bug_report_{}_{}_{}.yaml",
            scenario.seed,
            timestamp,
            self.bug_reports.len()
        ));

        let report = BugReport {
            scenario,
            actual_hash: &outcome.trace_hash,
            report: &outcome.report,
        };
        fs::create_dir_all(&self.directory)?;
        fs::write(&path, serde_yaml::to_string(&report)?)?;

        self.bug_reports.push(path.clone());
        Ok(path)
    }
}

/// Replays `scenario`, writing any bug report into the working directory.
pub fn replay(scenario: &Scenario) -> Result<SimulationOutcome, ScenarioError> {
    replay_with(scenario, &mut DiagnosticsCollector::default())
}

#[instrument(skip_all, fields(seed = scenario.seed, horizon = scenario.horizon))]
pub fn replay_with(
    scenario: &Scenario,
    diagnostics: &mut DiagnosticsCollector,
) -> Result<SimulationOutcome, ScenarioError> {
    scenario.validate()?;
    let outcome = Simulator::from_config(&scenario.config)?.run(scenario.seed, scenario.horizon)?;

    if outcome.trace_hash != scenario.expected_hash {
        warn!(
            expected = %scenario.expected_hash,
            actual = %outcome.trace_hash,
            "Hash mismatch"
        );
        let report = diagnostics.record_bug_report(scenario, &outcome)?;
        error!("Bug report saved to: {}", report.display());
        return Err(ScenarioError::HashMismatch {
            expected: scenario.expected_hash.clone(),
            actual: outcome.trace_hash,
            report,
        });
    }

    info!("Scenario validation successful");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn config() -> SlowlaneConfig {
        let mut config = SlowlaneConfig::default();
        config.system.queue_capacity = 3;
        config
    }

    #[test]
    fn test_recorded_scenario_replays() {
        let (scenario, recorded) = Scenario::record(&config(), 9, 150.0).unwrap();
        let replayed = replay(&scenario).unwrap();
        assert_eq!(recorded, replayed);
    }

    #[traced_test]
    #[test]
    fn test_mismatch_writes_bug_report() {
        let dir = tempfile::tempdir().unwrap();
        let (mut scenario, _) = Scenario::record(&config(), 9, 150.0).unwrap();
        scenario.expected_hash = "00".repeat(32);

        let mut diagnostics = DiagnosticsCollector::new(dir.path());
        let err = replay_with(&scenario, &mut diagnostics).unwrap_err();
        let report = match err {
            ScenarioError::HashMismatch { report, .. } => report,
            other => panic!("expected a hash mismatch, got {other}"),
        };

        assert_eq!(diagnostics.bug_reports(), [report.clone()]);
        let written = fs::read_to_string(&report).unwrap();
        assert!(written.contains("actual_hash"));
        assert!(logs_contain("Hash mismatch"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        let (scenario, _) = Scenario::record(&config(), 1, 20.0).unwrap();
        scenario.save_to_file(&path).unwrap();
        assert_eq!(Scenario::load_from_file(&path).unwrap(), scenario);
    }

    #[test]
    fn test_invalid_scenario_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (scenario, _) = Scenario::record(&config(), 1, 20.0).unwrap();

        let mut bad_horizon = scenario.clone();
        bad_horizon.horizon = -5.0;
        let mut bad_config = scenario.clone();
        bad_config.config.run.replications = 0;
        bad_config.config.telemetry.log_level = "nonsense".into();
        bad_config.config.reward = slowlane_config::RewardConfig::Deadline {
            deadline: -2.0,
            value: 1.0,
        };

        for (name, bad) in [("horizon", bad_horizon), ("config", bad_config)] {
            let path = dir.path().join(format!("{name}.yaml"));
            bad.save_to_file(&path).unwrap();
            assert!(
                matches!(Scenario::load_from_file(&path), Err(ScenarioError::Config(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_infinite_horizon_in_yaml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forever.yaml");
        let (scenario, _) = Scenario::record(&config(), 1, 20.0).unwrap();
        let text = serde_yaml::to_string(&scenario)
            .unwrap()
            .replace("horizon: 20.0", "horizon: .inf");
        fs::write(&path, text).unwrap();

        assert!(matches!(
            Scenario::load_from_file(&path),
            Err(ScenarioError::Config(_))
        ));
    }

    #[test]
    fn test_replay_checks_in_memory_scenario() {
        let (mut scenario, _) = Scenario::record(&config(), 1, 20.0).unwrap();
        scenario.horizon = f64::INFINITY;
        let dir = tempfile::tempdir().unwrap();
        let mut diagnostics = DiagnosticsCollector::new(dir.path());
        assert!(matches!(
            replay_with(&scenario, &mut diagnostics),
            Err(ScenarioError::Config(_))
        ));
        assert!(diagnostics.bug_reports().is_empty());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::load_from_file("no/such/scenario.yaml"),
            Err(ScenarioError::Io(_))
        ));
    }
}
