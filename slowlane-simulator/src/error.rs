use std::path::PathBuf;

use slowlane_config::ConfigError;
use slowlane_core::SimulationError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Unknown policy '{0}' (expected always-move, always-leave or threshold[k=N])")]
    UnknownPolicy(String),

    #[error("Replication task failed: {0}")]
    Join(String),
}

impl From<JoinError> for SimulatorError {
    fn from(err: JoinError) -> Self {
        SimulatorError::Join(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario format error: {0}")]
    Format(#[from] serde_yaml::Error),

    #[error("Invalid scenario: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulator(#[from] SimulatorError),

    #[error("Trace hash mismatch: expected {expected}, got {actual} (report: {})", report.display())]
    HashMismatch {
        expected: String,
        actual: String,
        report: PathBuf,
    },
}

impl From<SimulationError> for ScenarioError {
    fn from(err: SimulationError) -> Self {
        ScenarioError::Simulator(err.into())
    }
}
