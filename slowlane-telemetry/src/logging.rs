//! ## slowlane-telemetry::logging
//! **Console subscriber and run summaries**
//!
//! `RUST_LOG` wins over the configured level when it is set and parses.

use slowlane_core::stats::RunReport;
use tracing::{info, info_span};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Returns `false` if one was already set.
    pub fn init(level: &str) -> bool {
        fmt()
            .with_env_filter(Self::filter(level))
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .is_ok()
    }

    /// Filter from `RUST_LOG`, else `level`, else `info`.
    pub fn filter(level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Emits one structured line describing a finished run.
    pub fn log_run(label: &str, seed: u64, report: &RunReport) {
        let span = info_span!("run", label, seed);
        let _entered = span.enter();
        info!(
            arrivals = report.arrivals,
            losses = report.losses,
            fast_departures = report.fast_departures,
            slow_departures = report.slow_departures,
            benefit_rate = report.benefit_rate,
            average_response_time = report.average_response_time,
            loss_probability = report.loss_probability,
            "Run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slowlane_core::prelude::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_run_is_logged() {
        let system = QueueingSystem::new(
            SystemParams {
                arrival_rate: 1.0,
                fast_server_rate: 0.7,
                slow_server_rate: 0.2,
                queue_capacity: 10,
                loss_penalty: 1.0,
                overflow_rule: OverflowRule::AllowOneExtra,
            },
            |t: f64| 1.0 / (1.0 + t),
            |_: usize| Action::MoveToServer,
        )
        .unwrap();
        let report = system.run(&mut ExponentialSource::new(3), 100.0).unwrap();

        EventLogger::log_run("always-move", 3, &report);
        assert!(logs_contain("Run finished"));
        assert!(logs_contain("always-move"));
    }

    #[test]
    fn test_bad_level_falls_back() {
        // Must not panic on an unparsable directive.
        let _ = EventLogger::filter("not a level [");
    }
}
