/*!
# Slowlane Simulator

Seeded runs, replications and replayable scenarios on top of `slowlane-core`.

## Key Components:
- **Policies and rewards:** named strategies built from configuration.
- **Trace digest:** BLAKE3 fingerprint of the dispatched event sequence.
- **Replications:** independent seeds executed on tokio's blocking pool.
- **Replay engine:** recorded scenarios re-run and checked against their digest.
*/

use serde::Serialize;
use slowlane_config::SlowlaneConfig;
use slowlane_core::clock::EventKind;
use slowlane_core::observer::{EventObserver, NoopObserver};
use slowlane_core::random::ExponentialSource;
use slowlane_core::stats::RunReport;
use slowlane_core::QueueingSystem;
use tracing::{debug, instrument};

mod error;
pub mod policies;
pub mod replay;
pub mod replications;
pub mod rewards;
pub mod trace;

pub use error::{ScenarioError, SimulatorError};
pub use policies::{create_policy_by_name, Policy};
pub use replay::{replay, replay_with, DiagnosticsCollector, Scenario};
pub use replications::{run_replications, MetricSummary, ReplicationSummary};
pub use rewards::Reward;
pub use trace::{TraceHasher, TraceRecorder};

/// Result of one seeded run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub seed: u64,
    pub report: RunReport,
    /// Hex BLAKE3 digest of the event trace.
    pub trace_hash: String,
}

/// A configured queueing system ready to run with any seed.
pub struct Simulator {
    config: SlowlaneConfig,
    system: QueueingSystem<Reward, Policy>,
}

impl Simulator {
    pub fn from_config(config: &SlowlaneConfig) -> Result<Self, SimulatorError> {
        Self::with_policy(config, Policy::from(config.policy))
    }

    /// Builds from `config` but routes with `policy` instead of the configured one.
    pub fn with_policy(config: &SlowlaneConfig, policy: Policy) -> Result<Self, SimulatorError> {
        let params = config.system_params()?;
        let reward = Reward::from(config.reward);
        debug!(%policy, ?reward, utilization = params.utilization(), "Building simulator");

        let mut config = config.clone();
        config.policy = policy.into();
        Ok(Self {
            system: QueueingSystem::new(params, reward, policy)?,
            config,
        })
    }

    pub fn config(&self) -> &SlowlaneConfig {
        &self.config
    }

    pub fn policy(&self) -> Policy {
        *self.system.policy()
    }

    pub fn system(&self) -> &QueueingSystem<Reward, Policy> {
        &self.system
    }

    /// Runs once with an exponential source seeded by `seed`.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&self, seed: u64, horizon: f64) -> Result<SimulationOutcome, SimulatorError> {
        self.run_observed(seed, horizon, &mut NoopObserver)
    }

    /// Same as [`run`](Self::run), also forwarding every event to `observer`.
    pub fn run_observed<O: EventObserver + ?Sized>(
        &self,
        seed: u64,
        horizon: f64,
        observer: &mut O,
    ) -> Result<SimulationOutcome, SimulatorError> {
        let mut source = ExponentialSource::new(seed);
        let mut hasher = TraceHasher::new();
        let mut tee = |time: f64, kind: EventKind, queue_length: usize| {
            hasher.on_event(time, kind, queue_length);
            observer.on_event(time, kind, queue_length);
        };
        let report = self.system.run_observed(&mut source, horizon, &mut tee)?;

        Ok(SimulationOutcome {
            seed,
            report,
            trace_hash: hasher.finalize_hex(),
        })
    }
}
