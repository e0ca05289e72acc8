use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// A constructor or run parameter is outside its domain.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The random source produced a sample that cannot be used as a duration.
    #[error("Random source returned {sample} for exponential rate {rate}")]
    InvalidSample { rate: f64, sample: f64 },

    /// The dispatch loop found no pending event matching the earliest timestamp.
    #[error("Unreachable dispatch state at time {time}")]
    UnreachableState { time: f64 },
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
