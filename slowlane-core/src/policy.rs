//! Strategy seams for routing decisions and per-demand rewards.
//!
//! Both traits have blanket implementations for plain closures, so
//! `|queue_length| Action::MoveToServer` and `|t| 1.0 / (1.0 + t)` can be
//! passed straight into [`crate::QueueingSystem::new`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do with the head of the queue when only the slow server is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    LeaveInQueue,
    MoveToServer,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::LeaveInQueue => f.write_str("leave in queue"),
            Action::MoveToServer => f.write_str("move to server"),
        }
    }
}

/// Routing policy for the slow server.
///
/// Called with the queue length (head demand included) whenever the fast
/// server is busy and the slow server is free. Must be pure.
pub trait DecisionPolicy: Send + Sync {
    fn decide(&self, queue_length: usize) -> Action;
}

impl<F> DecisionPolicy for F
where
    F: Fn(usize) -> Action + Send + Sync,
{
    #[inline]
    fn decide(&self, queue_length: usize) -> Action {
        self(queue_length)
    }
}

/// Benefit earned by a demand that completed service with the given response time.
pub trait RewardFunction: Send + Sync {
    fn reward(&self, response_time: f64) -> f64;
}

impl<F> RewardFunction for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    #[inline]
    fn reward(&self, response_time: f64) -> f64 {
        self(response_time)
    }
}
