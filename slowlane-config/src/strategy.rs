//! Routing policy and reward function selection.
//!
//! Both are tagged by `kind` in YAML:
//!
//! ```yaml
//! policy:
//!   kind: threshold
//!   min_queue: 3
//! reward:
//!   kind: linear-decay
//!   base: 1.0
//!   slope: 0.1
//!   floor: 0.0
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which decision rule the slow server follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PolicyConfig {
    /// Always pull the head of the queue into a free slow server.
    #[default]
    AlwaysMove,
    /// Never use the slow server.
    AlwaysLeave,
    /// Pull only when at least `min_queue` demands are waiting.
    Threshold { min_queue: usize },
}

impl fmt::Display for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyConfig::AlwaysMove => write!(f, "always-move"),
            PolicyConfig::AlwaysLeave => write!(f, "always-leave"),
            PolicyConfig::Threshold { min_queue } => write!(f, "threshold[k={min_queue}]"),
        }
    }
}

/// Benefit earned by a completed demand as a function of its response time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RewardConfig {
    /// `scale / (1 + t)`.
    Hyperbolic {
        #[serde(default = "default_scale")]
        scale: f64,
    },
    Constant { value: f64 },
    /// `max(base - slope * t, floor)`.
    LinearDecay { base: f64, slope: f64, floor: f64 },
    /// `value` if the demand finished within `deadline`, otherwise nothing.
    Deadline { deadline: f64, value: f64 },
}

fn default_scale() -> f64 {
    1.0
}

impl Default for RewardConfig {
    fn default() -> Self {
        RewardConfig::Hyperbolic {
            scale: default_scale(),
        }
    }
}
