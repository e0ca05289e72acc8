//! ## slowlane-telemetry::metrics
//! **Prometheus counters and a response-time histogram per finished run**

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use slowlane_core::server::ServerId;
use slowlane_core::stats::RunReport;

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub runs: IntCounter,
    pub arrivals: IntCounter,
    pub losses: IntCounter,
    pub departures: IntCounterVec,
    pub average_response_time: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let runs = IntCounter::new("slowlane_runs_total", "Completed simulation runs")?;
        let arrivals = IntCounter::new("slowlane_arrivals_total", "Simulated arrivals")?;
        let losses = IntCounter::new("slowlane_losses_total", "Arrivals rejected by a full queue")?;
        let departures = IntCounterVec::new(
            Opts::new("slowlane_departures_total", "Completed services per server"),
            &["server"],
        )?;
        let average_response_time = Histogram::with_opts(
            HistogramOpts::new(
                "slowlane_average_response_time",
                "Average response time of each run",
            )
            .buckets(prometheus::exponential_buckets(0.25, 2.0, 10)?),
        )?;

        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(arrivals.clone()))?;
        registry.register(Box::new(losses.clone()))?;
        registry.register(Box::new(departures.clone()))?;
        registry.register(Box::new(average_response_time.clone()))?;

        Ok(Self {
            registry,
            runs,
            arrivals,
            losses,
            departures,
            average_response_time,
        })
    }

    pub fn record_run(&self, report: &RunReport) {
        self.runs.inc();
        self.arrivals.inc_by(report.arrivals);
        self.losses.inc_by(report.losses);
        for server in ServerId::ALL {
            self.departures
                .with_label_values(&[server.as_str()])
                .inc_by(report.departures_from(server));
        }
        // Runs without departures have no average to observe.
        if report.average_response_time.is_finite() {
            self.average_response_time
                .observe(report.average_response_time);
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slowlane_core::prelude::*;

    fn report(samples: Vec<f64>, horizon: f64) -> RunReport {
        let system = QueueingSystem::new(
            SystemParams {
                arrival_rate: 1.0,
                fast_server_rate: 1.0,
                slow_server_rate: 0.5,
                queue_capacity: 10,
                loss_penalty: 1.0,
                overflow_rule: OverflowRule::AllowOneExtra,
            },
            |_: f64| 1.0,
            |_: usize| Action::MoveToServer,
        )
        .unwrap();
        system
            .run(&mut ScriptedSource::new(samples), horizon)
            .unwrap()
    }

    #[test]
    fn test_record_run_updates_counters() {
        let metrics = MetricsRecorder::new().unwrap();
        let report = report(vec![1.0, 1.0, 5.0, 2.0, 10.0], 5.0);
        metrics.record_run(&report);

        assert_eq!(metrics.runs.get(), 1);
        assert_eq!(metrics.arrivals.get(), 3);
        assert_eq!(metrics.losses.get(), 0);
        assert_eq!(metrics.departures.with_label_values(&["fast"]).get(), 1);
        assert_eq!(metrics.departures.with_label_values(&["slow"]).get(), 1);
        assert_eq!(metrics.average_response_time.get_sample_count(), 1);
    }

    #[test]
    fn test_degenerate_run_skips_histogram() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_run(&report(vec![1.0], 0.0));
        assert_eq!(metrics.runs.get(), 1);
        assert_eq!(metrics.average_response_time.get_sample_count(), 0);
    }

    #[test]
    fn test_gather_metrics() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_run(&report(vec![1.0, 1.0, 5.0, 2.0, 10.0], 5.0));
        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("slowlane_runs_total 1"));
        assert!(text.contains("slowlane_departures_total{server=\"slow\"} 1"));
    }
}
