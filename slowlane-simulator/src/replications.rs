//! Independent replications and their confidence intervals.
//!
//! Replication `i` runs with seed `base_seed + i` (wrapping). Runs execute on
//! tokio's blocking pool with at most `workers` in flight; results are
//! returned in seed order regardless of completion order.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, instrument, warn};

use crate::{SimulationOutcome, Simulator, SimulatorError};

/// z-value of the two-sided 95% normal interval.
const Z_95: f64 = 1.959_963_984_540_054;

/// Sample statistics of one metric over the non-degenerate replications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std_dev: f64,
    /// Half-width of the 95% confidence interval around `mean`.
    pub half_width: f64,
    pub samples: usize,
    /// Replications where the metric was undefined (`NaN`).
    pub excluded: usize,
}

impl MetricSummary {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut excluded = 0;
        let defined: Vec<f64> = values
            .into_iter()
            .filter(|v| {
                let keep = v.is_finite();
                excluded += usize::from(!keep);
                keep
            })
            .collect();

        let n = defined.len();
        let mean = if n == 0 {
            f64::NAN
        } else {
            defined.iter().sum::<f64>() / n as f64
        };
        let std_dev = if n < 2 {
            f64::NAN
        } else {
            let squares: f64 = defined.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (n - 1) as f64).sqrt()
        };

        Self {
            mean,
            std_dev,
            half_width: Z_95 * std_dev / (n as f64).sqrt(),
            samples: n,
            excluded,
        }
    }

    /// `(low, high)` bounds of the 95% interval.
    pub fn interval(&self) -> (f64, f64) {
        (self.mean - self.half_width, self.mean + self.half_width)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplicationSummary {
    pub replications: usize,
    pub average_response_time: MetricSummary,
    pub loss_probability: MetricSummary,
    pub benefit_rate: MetricSummary,
    pub outcomes: Vec<SimulationOutcome>,
}

impl ReplicationSummary {
    pub fn from_outcomes(outcomes: Vec<SimulationOutcome>) -> Self {
        let metric = |f: fn(&SimulationOutcome) -> f64| {
            MetricSummary::from_values(outcomes.iter().map(f))
        };
        Self {
            replications: outcomes.len(),
            average_response_time: metric(|o| o.report.average_response_time),
            loss_probability: metric(|o| o.report.loss_probability),
            benefit_rate: metric(|o| o.report.benefit_rate),
            outcomes,
        }
    }
}

/// Runs `count` replications of `simulator`, at most `workers` at a time.
///
/// A `workers` value of 0 uses the number of CPUs. Every replication is
/// awaited before an error is returned; the error is that of the lowest
/// failing seed.
#[instrument(skip(simulator), fields(policy = %simulator.policy()))]
pub async fn run_replications(
    simulator: Arc<Simulator>,
    base_seed: u64,
    count: usize,
    horizon: f64,
    workers: usize,
) -> Result<ReplicationSummary, SimulatorError> {
    let workers = if workers == 0 { num_cpus::get() } else { workers };
    let permits = Arc::new(Semaphore::new(workers));
    info!(count, workers, horizon, "Starting replications");

    let mut handles = Vec::with_capacity(count);
    for index in 0..count as u64 {
        let seed = base_seed.wrapping_add(index);
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| SimulatorError::Join(e.to_string()))?;
        let simulator = simulator.clone();
        handles.push(spawn_blocking(move || {
            let _permit = permit;
            simulator.run(seed, horizon)
        }));
    }

    // Wait for every task before reporting a failure so none outlives this call.
    let mut results = Vec::with_capacity(count);
    for handle in handles {
        results.push(handle.await);
    }

    let mut outcomes = Vec::with_capacity(count);
    let mut failures = 0usize;
    let mut first_error = None;
    for result in results {
        match result.map_err(SimulatorError::from).and_then(|run| run) {
            Ok(outcome) => {
                debug!(seed = outcome.seed, hash = %outcome.trace_hash, "Replication finished");
                outcomes.push(outcome);
            }
            Err(e) => {
                failures += 1;
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        error!(failures, completed = outcomes.len(), "Replications failed: {e}");
        return Err(e);
    }

    let summary = ReplicationSummary::from_outcomes(outcomes);
    if summary.average_response_time.excluded > 0 {
        warn!(
            excluded = summary.average_response_time.excluded,
            "Some replications completed no service and were left out of the response time estimate"
        );
    }
    info!(
        mean_benefit_rate = summary.benefit_rate.mean,
        half_width = summary.benefit_rate.half_width,
        "Replications complete"
    );
    Ok(summary)
}
