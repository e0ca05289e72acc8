use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use slowlane_config::SlowlaneConfig;
use slowlane_simulator::{
    create_policy_by_name, replay_with, run_replications, DiagnosticsCollector, Policy,
    ReplicationSummary, Scenario, SimulationOutcome, Simulator,
};
use slowlane_telemetry::{EventLogger, MetricsRecorder};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured system, once or as independent replications
    Simulate(SimulateArgs),
    /// Re-run a recorded scenario and check its trace hash
    Replay(ReplayArgs),
    /// Compare threshold policies on the same system
    Sweep(SweepArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file; defaults to config/slowlane.yaml plus SLOWLANE_* overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub horizon: Option<f64>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub replications: Option<usize>,
    /// Maximum replications running at once
    #[arg(long)]
    pub workers: Option<usize>,
    /// Print Prometheus metrics when done
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub common: ConfigArgs,
    /// Policy name: always-move, always-leave or threshold[k=N]
    #[arg(long)]
    pub policy: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Fail unless a single run produces this trace hash
    #[arg(long)]
    pub validate_hash: Option<String>,
    /// Record the run as a replayable scenario
    #[arg(long)]
    pub save_scenario: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(short, long)]
    pub scenario: PathBuf,
    /// Where bug reports are written on a hash mismatch
    #[arg(long, default_value = ".")]
    pub report_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub common: ConfigArgs,
    /// Queue-length thresholds to compare, e.g. `0..=10` or `4`
    #[arg(long, value_parser = parse_thresholds, default_value = "0..=10")]
    pub thresholds: RangeInclusive<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Yaml,
}

fn parse_thresholds(value: &str) -> Result<RangeInclusive<usize>, String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid threshold '{s}': {e}"))
    };
    match value.split_once("..=") {
        Some((low, high)) => {
            let (low, high) = (parse(low)?, parse(high)?);
            if low > high {
                return Err(format!("empty threshold range {value}"));
            }
            Ok(low..=high)
        }
        None => parse(value).map(|k| k..=k),
    }
}

/// Loads the configuration, applies command-line overrides and starts logging.
fn prepare(args: &ConfigArgs) -> anyhow::Result<SlowlaneConfig> {
    let config = match &args.config {
        Some(path) => SlowlaneConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SlowlaneConfig::load()?,
    };
    let config = apply_overrides(config, args)?;

    EventLogger::init(&config.telemetry.log_level);
    let utilization = config.system_params()?.utilization();
    info!(
        utilization,
        horizon = config.run.horizon,
        "Configuration ready"
    );
    Ok(config)
}

/// Overrides values from the command line and re-checks the result.
fn apply_overrides(
    mut config: SlowlaneConfig,
    args: &ConfigArgs,
) -> anyhow::Result<SlowlaneConfig> {
    if let Some(horizon) = args.horizon {
        config.run.horizon = horizon;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }
    if let Some(replications) = args.replications {
        config.run.replications = replications;
    }
    if let Some(workers) = args.workers {
        config.run.workers = workers;
    }
    config.telemetry.metrics |= args.metrics;
    config.check().context("invalid command-line override")?;
    Ok(config)
}

pub async fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let config = prepare(&args.common)?;
    let simulator = match &args.policy {
        Some(name) => Simulator::with_policy(&config, create_policy_by_name(name)?)?,
        None => Simulator::from_config(&config)?,
    };
    let simulator = Arc::new(simulator);
    let metrics = MetricsRecorder::new()?;
    let (seed, horizon) = (config.run.seed, config.run.horizon);

    if config.run.replications > 1 {
        if args.validate_hash.is_some() || args.save_scenario.is_some() {
            warn!("--validate-hash and --save-scenario apply to single runs only; ignoring");
        }
        let summary = run_replications(
            simulator.clone(),
            seed,
            config.run.replications,
            horizon,
            config.run.workers,
        )
        .await?;
        for outcome in &summary.outcomes {
            metrics.record_run(&outcome.report);
        }
        match args.format {
            OutputFormat::Text => print_summary(&simulator.policy(), &summary),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&summary)?),
        }
    } else {
        let runner = simulator.clone();
        let outcome =
            tokio::task::spawn_blocking(move || runner.run(seed, horizon)).await??;
        EventLogger::log_run(&simulator.policy().to_string(), seed, &outcome.report);
        metrics.record_run(&outcome.report);
        print_outcome(&outcome, args.format)?;

        if let Some(expected) = &args.validate_hash {
            if *expected != outcome.trace_hash {
                bail!(
                    "Trace hash mismatch: expected {expected}, got {}",
                    outcome.trace_hash
                );
            }
            info!("Trace hash validated");
        }
        if let Some(path) = &args.save_scenario {
            save_scenario(&simulator, &outcome, horizon, path)?;
        }
    }

    if config.telemetry.metrics {
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

pub fn replay(args: ReplayArgs) -> anyhow::Result<()> {
    let scenario = Scenario::load_from_file(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;
    EventLogger::init(&scenario.config.telemetry.log_level);

    let mut diagnostics = DiagnosticsCollector::new(&args.report_dir);
    let outcome = replay_with(&scenario, &mut diagnostics)?;
    println!("{}", outcome.report);
    println!("Trace hash: {} (matches)", outcome.trace_hash);
    Ok(())
}

pub async fn sweep(args: SweepArgs) -> anyhow::Result<()> {
    let config = prepare(&args.common)?;
    let metrics = MetricsRecorder::new()?;
    let mut best: Option<(Policy, f64)> = None;
    if config.run.replications < 2 {
        warn!(
            replications = config.run.replications,
            "At least 2 replications are needed for a confidence interval"
        );
    }

    println!(
        "{:<18} {:>14} {:>12} {:>12} {:>12}",
        "policy", "benefit rate", "± 95%", "loss", "resp. time"
    );
    for min_queue in args.thresholds.clone() {
        let policy = Policy::Threshold { min_queue };
        let simulator = Arc::new(Simulator::with_policy(&config, policy)?);
        let summary = run_replications(
            simulator,
            config.run.seed,
            config.run.replications,
            config.run.horizon,
            config.run.workers,
        )
        .await?;
        for outcome in &summary.outcomes {
            metrics.record_run(&outcome.report);
        }

        let rate = summary.benefit_rate;
        println!(
            "{:<18} {:>14.6} {:>12} {:>12.6} {:>12.6}",
            policy.to_string(),
            rate.mean,
            format_interval(rate.half_width),
            summary.loss_probability.mean,
            summary.average_response_time.mean
        );
        if rate.mean.is_finite() && best.map_or(true, |(_, b)| rate.mean > b) {
            best = Some((policy, rate.mean));
        }
    }

    match best {
        Some((policy, rate)) => println!("Best: {policy} (benefit rate {rate:.6})"),
        None => warn!("No threshold produced a defined benefit rate"),
    }
    if config.telemetry.metrics {
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

/// Half-width column of the sweep table; `-` when there is no interval.
fn format_interval(half_width: f64) -> String {
    if half_width.is_finite() {
        format!("{half_width:.6}")
    } else {
        "-".to_string()
    }
}

fn print_outcome(outcome: &SimulationOutcome, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", outcome.report);
            println!("Seed: {}", outcome.seed);
            println!("Trace hash: {}", outcome.trace_hash);
        }
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(outcome)?),
    }
    Ok(())
}

fn print_summary(policy: &Policy, summary: &ReplicationSummary) {
    println!("Policy: {policy}, {} replications", summary.replications);
    for (name, metric) in [
        ("Benefit rate", &summary.benefit_rate),
        ("Average response time", &summary.average_response_time),
        ("Loss probability", &summary.loss_probability),
    ] {
        print!(
            "{name}: {:.6} ± {} (n = {})",
            metric.mean,
            format_interval(metric.half_width),
            metric.samples
        );
        if metric.excluded > 0 {
            print!(", {} undefined", metric.excluded);
        }
        println!();
    }
}

fn save_scenario(
    simulator: &Simulator,
    outcome: &SimulationOutcome,
    horizon: f64,
    path: &Path,
) -> anyhow::Result<()> {
    let scenario = Scenario {
        seed: outcome.seed,
        horizon,
        config: simulator.config().clone(),
        expected_hash: outcome.trace_hash.clone(),
    };
    scenario
        .save_to_file(path)
        .with_context(|| format!("writing scenario {}", path.display()))?;
    info!("Scenario saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(extra: &[&str]) -> ConfigArgs {
        let argv = ["slowlane", "sweep"].into_iter().chain(extra.iter().copied());
        let Commands::Sweep(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected sweep");
        };
        args.common
    }

    #[test]
    fn overrides_are_applied() {
        let args = overrides(&["--horizon", "50", "--replications", "4", "--seed", "9"]);
        let config = apply_overrides(SlowlaneConfig::default(), &args).unwrap();
        assert_eq!(config.run.horizon, 50.0);
        assert_eq!(config.run.replications, 4);
        assert_eq!(config.run.seed, 9);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        for bad in [
            ["--horizon", "inf"],
            ["--horizon=-1", "--seed=1"],
            ["--replications", "0"],
            ["--workers", "0"],
        ] {
            let args = overrides(&bad);
            let err = apply_overrides(SlowlaneConfig::default(), &args).unwrap_err();
            assert!(
                format!("{err:#}").contains("invalid command-line override"),
                "{bad:?} was accepted"
            );
        }
    }

    #[test]
    fn missing_interval_prints_dash() {
        assert_eq!(format_interval(0.125), "0.125000");
        assert_eq!(format_interval(f64::NAN), "-");
        assert_eq!(format_interval(f64::INFINITY), "-");
    }

    #[test]
    fn threshold_ranges() {
        assert_eq!(parse_thresholds("0..=10").unwrap(), 0..=10);
        assert_eq!(parse_thresholds("4").unwrap(), 4..=4);
        assert!(parse_thresholds("5..=2").is_err());
        assert!(parse_thresholds("a..=2").is_err());
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "slowlane",
            "simulate",
            "--horizon",
            "100",
            "--policy",
            "threshold[k=2]",
            "--format",
            "yaml",
        ])
        .unwrap();
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.common.horizon, Some(100.0));
        assert_eq!(args.format, OutputFormat::Yaml);
        assert_eq!(args.policy.as_deref(), Some("threshold[k=2]"));
    }

    #[test]
    fn cli_parses_sweep() {
        let cli = Cli::try_parse_from(["slowlane", "sweep", "--thresholds", "1..=3"]).unwrap();
        let Commands::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!(args.thresholds, 1..=3);
    }
}
