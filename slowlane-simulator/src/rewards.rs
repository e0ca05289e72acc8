//! Reward functions mapping a response time to the benefit it earns.

use slowlane_config::RewardConfig;
use slowlane_core::policy::RewardFunction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reward {
    Hyperbolic { scale: f64 },
    Constant { value: f64 },
    LinearDecay { base: f64, slope: f64, floor: f64 },
    Deadline { deadline: f64, value: f64 },
}

impl RewardFunction for Reward {
    #[inline]
    fn reward(&self, response_time: f64) -> f64 {
        match *self {
            Reward::Hyperbolic { scale } => scale / (1.0 + response_time),
            Reward::Constant { value } => value,
            Reward::LinearDecay { base, slope, floor } => (base - slope * response_time).max(floor),
            Reward::Deadline { deadline, value } => {
                if response_time <= deadline {
                    value
                } else {
                    0.0
                }
            }
        }
    }
}

impl From<RewardConfig> for Reward {
    fn from(config: RewardConfig) -> Self {
        match config {
            RewardConfig::Hyperbolic { scale } => Reward::Hyperbolic { scale },
            RewardConfig::Constant { value } => Reward::Constant { value },
            RewardConfig::LinearDecay { base, slope, floor } => {
                Reward::LinearDecay { base, slope, floor }
            }
            RewardConfig::Deadline { deadline, value } => Reward::Deadline { deadline, value },
        }
    }
}
