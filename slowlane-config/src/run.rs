//! Run length, seeding and replication settings.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Run configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct RunConfig {
    /// Simulated time after which the run stops.
    #[serde(default = "default_horizon")]
    #[validate(custom(function = validation::validate_horizon))]
    pub horizon: f64,

    /// Base seed; replication `i` uses `seed + i`.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of independent runs.
    #[serde(default = "default_replications")]
    #[validate(range(min = 1, max = 100000))]
    pub replications: usize,

    /// Upper bound on concurrently executing runs.
    #[serde(default = "default_workers")]
    #[validate(range(min = 1, max = 1024))]
    pub workers: usize,
}

fn default_horizon() -> f64 {
    1_000_000.0
}

fn default_seed() -> u64 {
    42
}

fn default_replications() -> usize {
    1
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            seed: default_seed(),
            replications: default_replications(),
            workers: default_workers(),
        }
    }
}
