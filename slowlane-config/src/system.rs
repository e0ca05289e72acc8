//! Queueing system parameters.
//!
//! Rates, waiting-room size and rejection penalty. Converted into the core
//! [`SystemParams`] once validated.

use serde::{Deserialize, Serialize};
use slowlane_core::{OverflowRule, SystemParams};
use validator::{self, Validate};

use crate::error::ConfigError;
use crate::validation;

/// Queueing system configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SystemConfig {
    /// Rate of the exponential interarrival distribution.
    #[serde(default = "default_arrival_rate")]
    #[validate(custom(function = validation::validate_rate))]
    pub arrival_rate: f64,

    /// Service rate of the fast server.
    #[serde(default = "default_fast_rate")]
    #[validate(custom(function = validation::validate_rate))]
    pub fast_server_rate: f64,

    /// Service rate of the slow server.
    #[serde(default = "default_slow_rate")]
    #[validate(custom(function = validation::validate_rate))]
    pub slow_server_rate: f64,

    /// Waiting-room bound.
    #[serde(default = "default_capacity")]
    #[validate(range(max = 1000000))]
    pub queue_capacity: usize,

    /// Benefit deducted for each rejected arrival.
    #[serde(default = "default_penalty")]
    #[validate(custom(function = validation::validate_finite))]
    pub loss_penalty: f64,

    #[serde(default)]
    pub overflow_rule: OverflowRule,
}

fn default_arrival_rate() -> f64 {
    1.0
}

fn default_fast_rate() -> f64 {
    0.7
}

fn default_slow_rate() -> f64 {
    0.2
}

fn default_capacity() -> usize {
    10
}

fn default_penalty() -> f64 {
    1.0
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            arrival_rate: default_arrival_rate(),
            fast_server_rate: default_fast_rate(),
            slow_server_rate: default_slow_rate(),
            queue_capacity: default_capacity(),
            loss_penalty: default_penalty(),
            overflow_rule: OverflowRule::default(),
        }
    }
}

impl SystemConfig {
    /// Builds the core parameters and runs the core's own checks on them.
    pub fn to_params(&self) -> Result<SystemParams, ConfigError> {
        let params = SystemParams::from(self);
        params.validate()?;
        Ok(params)
    }
}

impl From<&SystemConfig> for SystemParams {
    fn from(config: &SystemConfig) -> Self {
        SystemParams {
            arrival_rate: config.arrival_rate,
            fast_server_rate: config.fast_server_rate,
            slow_server_rate: config.slow_server_rate,
            queue_capacity: config.queue_capacity,
            loss_penalty: config.loss_penalty,
            overflow_rule: config.overflow_rule,
        }
    }
}
