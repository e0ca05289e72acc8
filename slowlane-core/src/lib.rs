//! # slowlane-core
//!
//! Discrete-event engine for a single arrival stream feeding a bounded waiting
//! room and two heterogeneous servers ("fast" and "slow"). The slow server only
//! pulls work when the injected decision policy says so.
//!
//! ### Expectations:
//! - One owned `SimulationState` per run, no globals
//! - Fixed tie-break order: arrival, service admission, fast departure, slow departure
//! - Bit-for-bit reproducible runs for a fixed sample stream
//!
//! ### Key Submodules:
//! - `clock`: next-event timestamps and dispatch selection
//! - `handlers`: arrival, service admission and departure handlers
//! - `stats`: running accumulators and the finalized `RunReport`
//! - `policy`: `Action`, `DecisionPolicy` and `RewardFunction` seams
//! - `random`: `RandomSource` seam with a seeded and a scripted source

pub mod clock;
pub mod demand;
pub mod engine;
pub mod error;
mod handlers;
pub mod observer;
pub mod policy;
pub mod random;
pub mod server;
pub mod state;
pub mod stats;

pub mod prelude {
    pub use crate::clock::{EventClock, EventKind};
    pub use crate::demand::Demand;
    pub use crate::engine::{OverflowRule, QueueingSystem, SystemParams};
    pub use crate::error::*;
    pub use crate::observer::{EventObserver, NoopObserver};
    pub use crate::policy::{Action, DecisionPolicy, RewardFunction};
    pub use crate::random::{ExponentialSource, RandomSource, ScriptedSource};
    pub use crate::server::ServerId;
    pub use crate::stats::RunReport;
}

pub use engine::{OverflowRule, QueueingSystem, SystemParams};
pub use error::SimulationError;
