//! ## slowlane-core::engine
//! **Configured queueing system and the event dispatch loop**
//!
//! A [`QueueingSystem`] is immutable once built. Every call to
//! [`QueueingSystem::run`] creates its own [`SimulationState`], so one system
//! can be shared by several threads running independent replications.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::clock::EventKind;
use crate::error::SimulationError;
use crate::observer::{EventObserver, NoopObserver};
use crate::policy::{DecisionPolicy, RewardFunction};
use crate::random::RandomSource;
use crate::server::ServerId;
use crate::state::SimulationState;
use crate::stats::RunReport;

/// When an arriving demand is turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowRule {
    /// Reject when the queue already holds more than `queue_capacity` demands,
    /// so the queue can reach `queue_capacity + 1`.
    #[default]
    AllowOneExtra,
    /// Reject when the queue already holds `queue_capacity` demands.
    AtCapacity,
}

impl OverflowRule {
    #[inline]
    pub fn rejects(self, queue_length: usize, queue_capacity: usize) -> bool {
        match self {
            OverflowRule::AllowOneExtra => queue_length > queue_capacity,
            OverflowRule::AtCapacity => queue_length >= queue_capacity,
        }
    }
}

/// Numeric parameters of the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemParams {
    pub arrival_rate: f64,
    pub fast_server_rate: f64,
    pub slow_server_rate: f64,
    pub queue_capacity: usize,
    pub loss_penalty: f64,
    #[serde(default)]
    pub overflow_rule: OverflowRule,
}

impl SystemParams {
    /// Rejects non-positive or non-finite rates and a non-finite penalty.
    pub fn validate(&self) -> Result<(), SimulationError> {
        check_rate("arrival_rate", self.arrival_rate)?;
        check_rate("fast_server_rate", self.fast_server_rate)?;
        check_rate("slow_server_rate", self.slow_server_rate)?;
        if !self.loss_penalty.is_finite() {
            return Err(SimulationError::invalid(
                "loss_penalty",
                format!("must be finite, got {}", self.loss_penalty),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn service_rate(&self, server: ServerId) -> f64 {
        match server {
            ServerId::Fast => self.fast_server_rate,
            ServerId::Slow => self.slow_server_rate,
        }
    }

    /// Offered load against the combined service capacity of both servers.
    pub fn utilization(&self) -> f64 {
        self.arrival_rate / (self.fast_server_rate + self.slow_server_rate)
    }
}

fn check_rate(name: &'static str, rate: f64) -> Result<(), SimulationError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            name,
            format!("must be a positive finite rate, got {rate}"),
        ))
    }
}

/// Two-server queueing system with injected reward and routing strategies.
pub struct QueueingSystem<R, D> {
    pub(crate) params: SystemParams,
    pub(crate) reward: R,
    pub(crate) policy: D,
}

impl<R: RewardFunction, D: DecisionPolicy> QueueingSystem<R, D> {
    /// Validates `params` and builds the system.
    pub fn new(params: SystemParams, reward: R, policy: D) -> Result<Self, SimulationError> {
        params.validate()?;
        debug!(?params, "Queueing system configured");
        Ok(Self {
            params,
            reward,
            policy,
        })
    }

    pub fn params(&self) -> &SystemParams {
        &self.params
    }

    pub fn reward(&self) -> &R {
        &self.reward
    }

    pub fn policy(&self) -> &D {
        &self.policy
    }

    /// Runs until the clock reaches `max_time` and returns the report.
    pub fn run<S>(&self, source: &mut S, max_time: f64) -> Result<RunReport, SimulationError>
    where
        S: RandomSource + ?Sized,
    {
        self.run_observed(source, max_time, &mut NoopObserver)
    }

    /// Same as [`run`](Self::run), reporting each dispatched event to `observer`.
    ///
    /// At least one event is processed. The loop stops once the event just
    /// handled brought the clock to `max_time` or beyond; that event is
    /// fully accounted for.
    #[instrument(level = "debug", skip_all, fields(max_time = max_time))]
    pub fn run_observed<S, O>(
        &self,
        source: &mut S,
        max_time: f64,
        observer: &mut O,
    ) -> Result<RunReport, SimulationError>
    where
        S: RandomSource + ?Sized,
        O: EventObserver + ?Sized,
    {
        if !max_time.is_finite() || max_time < 0.0 {
            return Err(SimulationError::invalid(
                "max_time",
                format!("must be a finite, non-negative horizon, got {max_time}"),
            ));
        }

        let mut state = SimulationState::new();
        let mut events_processed: u64 = 0;

        loop {
            let kind = state.clock.advance().inspect_err(|e| {
                error!(
                    "Aborting run after {events_processed} events: {e} (queue {}, busy servers {})",
                    state.queue.len(),
                    state.servers.busy_count()
                );
            })?;

            match kind {
                EventKind::Arrival => self.on_arrival(&mut state, source)?,
                EventKind::ServiceAdmission => self.on_service_admission(&mut state, source)?,
                EventKind::Departure(server) => self.on_departure(&mut state, server),
            }
            events_processed += 1;

            let now = state.clock.now();
            trace!(time = now, ?kind, queue = state.queue.len(), "Event handled");
            observer.on_event(now, kind, state.queue.len());

            if now >= max_time {
                break;
            }
        }

        let report = state
            .stats
            .finalize(max_time, state.clock.now(), events_processed);

        if report.is_degenerate() {
            warn!(
                arrivals = report.arrivals,
                departures = report.departures,
                "Run ended without arrivals or departures; undefined rates are NaN"
            );
        }
        info!(
            events = report.events_processed,
            total_benefit = report.total_benefit,
            average_response_time = report.average_response_time,
            loss_probability = report.loss_probability,
            "Run complete"
        );
        Ok(report)
    }
}
