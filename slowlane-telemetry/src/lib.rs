//! # Slowlane Telemetry
//!
//! Subscriber setup for `tracing` and a Prometheus recorder for run results.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
