//! Everything that changes during one run, owned by that run alone.

use std::collections::VecDeque;

use crate::clock::EventClock;
use crate::demand::Demand;
use crate::server::ServerSlots;
use crate::stats::Statistics;

#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    pub(crate) clock: EventClock,
    pub(crate) queue: VecDeque<Demand>,
    pub(crate) servers: ServerSlots,
    pub(crate) stats: Statistics,
}

impl SimulationState {
    /// Empty queue, idle servers, zeroed statistics, first arrival at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    #[inline]
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    pub fn clock(&self) -> &EventClock {
        &self.clock
    }

    pub fn servers(&self) -> &ServerSlots {
        &self.servers
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }
}
