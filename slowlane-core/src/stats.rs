//! ## slowlane-core::stats
//! **Running accumulators and the finalized run report**
//!
//! Rates with a zero denominator (no arrivals, no completed departures, zero
//! horizon) are reported as `NaN` rather than a made-up number. Callers that
//! need valid rates check [`RunReport::is_degenerate`] or the raw counts.

use std::fmt;

use serde::Serialize;

use crate::server::ServerId;

/// Per-run accumulators. Reset by constructing a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    total_benefit: f64,
    response_time_sum: f64,
    completed: [u64; 2],
    losses: u64,
    arrivals: u64,
    admitted: u64,
    peak_queue_length: usize,
}

impl Statistics {
    #[inline]
    pub fn record_arrival(&mut self) {
        self.arrivals += 1;
    }

    #[inline]
    pub fn record_loss(&mut self, penalty: f64) {
        self.total_benefit -= penalty;
        self.losses += 1;
    }

    #[inline]
    pub fn record_admission(&mut self, queue_length: usize) {
        self.admitted += 1;
        self.peak_queue_length = self.peak_queue_length.max(queue_length);
    }

    #[inline]
    pub fn record_departure(&mut self, server: ServerId, response_time: f64, reward: f64) {
        self.total_benefit += reward;
        self.response_time_sum += response_time;
        self.completed[server.index()] += 1;
    }

    pub fn total_benefit(&self) -> f64 {
        self.total_benefit
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn losses(&self) -> u64 {
        self.losses
    }

    pub fn departures(&self) -> u64 {
        self.completed.iter().sum()
    }

    /// Converts the running sums into rates.
    pub fn finalize(&self, horizon: f64, final_time: f64, events_processed: u64) -> RunReport {
        let departures = self.departures();
        RunReport {
            total_benefit: self.total_benefit,
            benefit_rate: ratio(self.total_benefit, horizon),
            average_response_time: ratio(self.response_time_sum, departures as f64),
            loss_probability: ratio(self.losses as f64, self.arrivals as f64),
            arrivals: self.arrivals,
            losses: self.losses,
            admitted: self.admitted,
            departures,
            fast_departures: self.completed[ServerId::Fast.index()],
            slow_departures: self.completed[ServerId::Slow.index()],
            peak_queue_length: self.peak_queue_length,
            horizon,
            final_time,
            events_processed,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Rewards of completed demands minus penalties of rejected ones.
    pub total_benefit: f64,
    /// `total_benefit / horizon`.
    pub benefit_rate: f64,
    pub average_response_time: f64,
    pub loss_probability: f64,
    pub arrivals: u64,
    pub losses: u64,
    pub admitted: u64,
    pub departures: u64,
    pub fast_departures: u64,
    pub slow_departures: u64,
    pub peak_queue_length: usize,
    pub horizon: f64,
    /// Clock value after the last processed event; at least `horizon`.
    pub final_time: f64,
    pub events_processed: u64,
}

impl RunReport {
    /// `(average_response_time, loss_probability)`.
    pub fn rates(&self) -> (f64, f64) {
        (self.average_response_time, self.loss_probability)
    }

    /// True when a rate could not be computed for lack of arrivals or departures.
    pub fn is_degenerate(&self) -> bool {
        self.arrivals == 0 || self.departures == 0
    }

    pub fn departures_from(&self, server: ServerId) -> u64 {
        match server {
            ServerId::Fast => self.fast_departures,
            ServerId::Slow => self.slow_departures,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total_benefit: {}", self.total_benefit)?;
        writeln!(f, "benefit_rate: {}", self.benefit_rate)?;
        writeln!(f, "average_response_time: {}", self.average_response_time)?;
        writeln!(f, "loss_probability: {}", self.loss_probability)?;
        writeln!(
            f,
            "arrivals: {} (admitted {}, lost {})",
            self.arrivals, self.admitted, self.losses
        )?;
        writeln!(
            f,
            "departures: {} (fast {}, slow {})",
            self.departures, self.fast_departures, self.slow_departures
        )?;
        write!(
            f,
            "peak_queue_length: {}, events: {}, final_time: {}",
            self.peak_queue_length, self.events_processed, self.final_time
        )
    }
}
