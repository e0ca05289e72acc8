//! Slow-server routing policies.
//!
//! Each policy can be built from its configuration entry or parsed from the
//! short name printed in reports (`always-move`, `always-leave`,
//! `threshold[k=3]`).

use std::fmt;
use std::str::FromStr;

use slowlane_config::PolicyConfig;
use slowlane_core::policy::{Action, DecisionPolicy};

use crate::error::SimulatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    AlwaysMove,
    AlwaysLeave,
    /// Moves a demand to the slow server only once `min_queue` are waiting.
    Threshold { min_queue: usize },
}

impl DecisionPolicy for Policy {
    #[inline]
    fn decide(&self, queue_length: usize) -> Action {
        match *self {
            Policy::AlwaysMove => Action::MoveToServer,
            Policy::AlwaysLeave => Action::LeaveInQueue,
            Policy::Threshold { min_queue } if queue_length >= min_queue => Action::MoveToServer,
            Policy::Threshold { .. } => Action::LeaveInQueue,
        }
    }
}

impl From<PolicyConfig> for Policy {
    fn from(config: PolicyConfig) -> Self {
        match config {
            PolicyConfig::AlwaysMove => Policy::AlwaysMove,
            PolicyConfig::AlwaysLeave => Policy::AlwaysLeave,
            PolicyConfig::Threshold { min_queue } => Policy::Threshold { min_queue },
        }
    }
}

impl From<Policy> for PolicyConfig {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::AlwaysMove => PolicyConfig::AlwaysMove,
            Policy::AlwaysLeave => PolicyConfig::AlwaysLeave,
            Policy::Threshold { min_queue } => PolicyConfig::Threshold { min_queue },
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PolicyConfig::from(*self).fmt(f)
    }
}

impl FromStr for Policy {
    type Err = SimulatorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        create_policy_by_name(name)
    }
}

pub fn create_policy_by_name(name: &str) -> Result<Policy, SimulatorError> {
    match name {
        "always-move" => Ok(Policy::AlwaysMove),
        "always-leave" => Ok(Policy::AlwaysLeave),
        _ => name
            .strip_prefix("threshold[k=")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|k| k.parse::<usize>().ok())
            .map(|min_queue| Policy::Threshold { min_queue })
            .ok_or_else(|| SimulatorError::UnknownPolicy(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_decides_on_queue_length() {
        let policy = Policy::Threshold { min_queue: 3 };
        assert_eq!(policy.decide(2), Action::LeaveInQueue);
        assert_eq!(policy.decide(3), Action::MoveToServer);
        assert_eq!(Policy::Threshold { min_queue: 0 }.decide(0), Action::MoveToServer);
    }

    #[test]
    fn names_parse_back() {
        for policy in [
            Policy::AlwaysMove,
            Policy::AlwaysLeave,
            Policy::Threshold { min_queue: 12 },
        ] {
            assert_eq!(policy.to_string().parse::<Policy>().unwrap(), policy);
        }
    }

    #[test]
    fn unknown_names_are_errors() {
        for name in ["", "random", "threshold[k=]", "threshold[k=-1]", "threshold[k=2"] {
            assert!(
                matches!(create_policy_by_name(name), Err(SimulatorError::UnknownPolicy(_))),
                "{name} should be rejected"
            );
        }
    }
}
