//! Custom validation functions for configuration.
//!
//! Shared checks used by the `system`, `strategy` and `telemetry` sections.

use validator::ValidationError;

use crate::strategy::RewardConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate that a rate is strictly positive and finite.
pub fn validate_rate(rate: f64) -> Result<(), ValidationError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive_finite")
            .with_message("rate must be a positive finite number".into()))
    }
}

/// Validate that a value is a finite number (no NaN or infinity).
pub fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_finite"))
    }
}

/// Validate a horizon: finite and not negative.
pub fn validate_horizon(horizon: f64) -> Result<(), ValidationError> {
    if horizon.is_finite() && horizon >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_horizon")
            .with_message("horizon must be a finite, non-negative time".into()))
    }
}

/// Validate log level names accepted by the tracing filter.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate the numeric parameters of a reward function.
pub fn validate_reward(reward: &RewardConfig) -> Result<(), ValidationError> {
    let finite = |values: &[f64]| values.iter().all(|v| v.is_finite());
    let valid = match *reward {
        RewardConfig::Hyperbolic { scale } => finite(&[scale]),
        RewardConfig::Constant { value } => finite(&[value]),
        RewardConfig::LinearDecay { base, slope, floor } => {
            finite(&[base, slope, floor]) && slope >= 0.0 && floor <= base
        }
        RewardConfig::Deadline { deadline, value } => finite(&[deadline, value]) && deadline >= 0.0,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_reward"))
    }
}
