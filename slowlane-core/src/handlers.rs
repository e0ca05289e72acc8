//! The four event handlers. Each runs to completion and leaves the clock with
//! its own timestamp either rescheduled or reset to "never".

use tracing::trace;

use crate::demand::Demand;
use crate::engine::QueueingSystem;
use crate::error::SimulationError;
use crate::policy::{Action, DecisionPolicy, RewardFunction};
use crate::random::RandomSource;
use crate::server::ServerId;
use crate::state::SimulationState;

/// Draws an exponential duration and checks it can move the clock forward.
fn draw<S: RandomSource + ?Sized>(source: &mut S, rate: f64) -> Result<f64, SimulationError> {
    let sample = source.exponential(rate);
    if sample.is_finite() && sample >= 0.0 {
        Ok(sample)
    } else {
        Err(SimulationError::InvalidSample { rate, sample })
    }
}

impl<R: RewardFunction, D: DecisionPolicy> QueueingSystem<R, D> {
    /// Admits or rejects the arriving demand, then schedules the next arrival.
    pub(crate) fn on_arrival<S: RandomSource + ?Sized>(
        &self,
        state: &mut SimulationState,
        source: &mut S,
    ) -> Result<(), SimulationError> {
        let now = state.clock.now();
        state.stats.record_arrival();

        if self
            .params
            .overflow_rule
            .rejects(state.queue.len(), self.params.queue_capacity)
        {
            state.stats.record_loss(self.params.loss_penalty);
            trace!(time = now, queue = state.queue.len(), "Arrival rejected");
        } else {
            state.queue.push_back(Demand::arrive(now));
            state.stats.record_admission(state.queue.len());
            state.clock.arm_admission();
        }

        let gap = draw(source, self.params.arrival_rate)?;
        state.clock.delay_arrival(gap);
        Ok(())
    }

    /// Moves the head of the queue into a free server, fast server first.
    pub(crate) fn on_service_admission<S: RandomSource + ?Sized>(
        &self,
        state: &mut SimulationState,
        source: &mut S,
    ) -> Result<(), SimulationError> {
        if !state.queue.is_empty() {
            if state.servers.is_free(ServerId::Fast) {
                self.start_service(state, source, ServerId::Fast)?;
            } else if state.servers.is_free(ServerId::Slow) {
                match self.policy.decide(state.queue.len()) {
                    Action::MoveToServer => self.start_service(state, source, ServerId::Slow)?,
                    Action::LeaveInQueue => {
                        trace!(queue = state.queue.len(), "Policy kept demand in queue");
                    }
                }
            }
        }
        state.clock.clear_admission();
        Ok(())
    }

    fn start_service<S: RandomSource + ?Sized>(
        &self,
        state: &mut SimulationState,
        source: &mut S,
        server: ServerId,
    ) -> Result<(), SimulationError> {
        let now = state.clock.now();
        let Some(mut demand) = state.queue.pop_front() else {
            return Ok(());
        };
        demand.start_service(now);

        let duration = draw(source, self.params.service_rate(server))?;
        state.clock.schedule_departure(server, now + duration);
        let previous = state.servers.occupy(server, demand);
        debug_assert!(previous.is_none(), "{server} server was already busy");
        Ok(())
    }

    /// Completes service on `server`, books the reward and frees the slot.
    pub(crate) fn on_departure(&self, state: &mut SimulationState, server: ServerId) {
        if let Some(mut demand) = state.servers.release(server) {
            let now = state.clock.now();
            let response_time = demand.depart(now);
            let reward = self.reward.reward(response_time);
            state.stats.record_departure(server, response_time, reward);
            state.clock.arm_admission();
        }
        state.clock.clear_departure(server);
    }
}
