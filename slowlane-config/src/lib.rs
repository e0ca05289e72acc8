//! # Slowlane Configuration System
//!
//! Layered configuration for the two-server queue simulator.
//!
//! ## Features
//! - **Single Source**: system parameters, routing policy, reward, run and telemetry settings
//! - **Validation**: field-level checks through `validator`, then the core's own parameter checks
//! - **Environment Overrides**: any field can be set with `SLOWLANE_<SECTION>__<FIELD>`

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use slowlane_core::SystemParams;
use tracing::debug;
use validator::{Validate, ValidationErrors};

mod error;
mod run;
mod strategy;
mod system;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use run::RunConfig;
pub use strategy::{PolicyConfig, RewardConfig};
pub use system::SystemConfig;
pub use telemetry::TelemetryConfig;

const DEFAULT_CONFIG_FILE: &str = "config/slowlane.yaml";
const ENV_PREFIX: &str = "SLOWLANE_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct SlowlaneConfig {
    /// Rates, capacity and penalty of the queueing system.
    #[serde(default)]
    #[validate(nested)]
    pub system: SystemConfig,

    /// Slow-server routing policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Reward earned per completed demand.
    #[serde(default)]
    #[validate(custom(function = validation::validate_reward))]
    pub reward: RewardConfig,

    #[serde(default)]
    #[validate(nested)]
    pub run: RunConfig,

    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl SlowlaneConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/slowlane.yaml`, if present
    /// 3. `config/<SLOWLANE_ENV>.yaml`, if `SLOWLANE_ENV` is set and the file exists
    /// 4. `SLOWLANE_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(SlowlaneConfig::default()));

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_FILE));
        } else {
            debug!("{DEFAULT_CONFIG_FILE} not found, using default configuration");
        }

        if let Ok(env) = std::env::var("SLOWLANE_ENV") {
            let env_file = format!("config/{env}.yaml");
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file, still honouring `SLOWLANE_*` overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(SlowlaneConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Parse a YAML document on top of the defaults, without consulting the environment.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::extract(
            Figment::from(Serialized::defaults(SlowlaneConfig::default()))
                .merge(Yaml::string(yaml)),
        )
    }

    /// Core parameters for [`slowlane_core::QueueingSystem::new`].
    pub fn system_params(&self) -> Result<SystemParams, ConfigError> {
        self.system.to_params()
    }

    /// Re-runs field validation, e.g. after values were changed in code.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Ok(())
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.check()?;
        debug!(policy = %config.policy, reward = ?config.reward, "Configuration loaded");
        Ok(config)
    }
}

/// Rejects a horizon that is negative or not finite.
pub fn check_horizon(horizon: f64) -> Result<(), ConfigError> {
    validation::validate_horizon(horizon).map_err(|error| {
        let mut errors = ValidationErrors::new();
        errors.add("horizon", error);
        ConfigError::Validation(errors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn full_config_validation() {
        let config = SlowlaneConfig::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config.run.horizon, 1_000_000.0);
        assert_eq!(config.reward, RewardConfig::Hyperbolic { scale: 1.0 });
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SlowlaneConfig::from_yaml_str(
            "system:\n  queue_capacity: 3\n  overflow_rule: at-capacity\npolicy:\n  kind: threshold\n  min_queue: 2\n",
        )
        .unwrap();
        assert_eq!(config.system.queue_capacity, 3);
        assert_eq!(config.system.arrival_rate, 1.0);
        assert_eq!(config.policy, PolicyConfig::Threshold { min_queue: 2 });
        assert_eq!(config.run.seed, 42);
    }

    #[test]
    fn validation_errors_name_the_field() {
        let err = SlowlaneConfig::from_yaml_str("system:\n  arrival_rate: -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("system.arrival_rate"));
    }

    #[test]
    fn invalid_reward_is_rejected() {
        let err = SlowlaneConfig::from_yaml_str(
            "reward:\n  kind: deadline\n  deadline: -2.0\n  value: 1.0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("reward"));
    }

    #[test]
    fn check_catches_values_changed_after_loading() {
        let mut config = SlowlaneConfig::default();
        config.check().unwrap();

        config.run.horizon = f64::INFINITY;
        config.run.workers = 0;
        config.run.replications = 0;
        let message = config.check().unwrap_err().to_string();
        assert!(message.contains("run.horizon"));
        assert!(message.contains("run.workers"));
        assert!(message.contains("run.replications"));
    }

    #[test]
    fn horizon_check() {
        check_horizon(0.0).unwrap();
        for horizon in [-1.0, f64::INFINITY, f64::NAN] {
            let err = check_horizon(horizon).unwrap_err();
            assert!(err.to_string().contains("horizon"), "{horizon}");
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let err = SlowlaneConfig::load_from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn environment_override() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/slowlane.yaml",
                "system:\n  fast_server_rate: 2.0\nrun:\n  horizon: 50.0\n",
            )?;
            jail.set_env("SLOWLANE_RUN__SEED", 7);
            jail.set_env("SLOWLANE_SYSTEM__QUEUE_CAPACITY", 4);

            let config = SlowlaneConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.system.fast_server_rate, 2.0);
            assert_eq!(config.system.queue_capacity, 4);
            assert_eq!(config.run.horizon, 50.0);
            assert_eq!(config.run.seed, 7);
            Ok(())
        });
    }

    #[test]
    fn environment_profile_file() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/sweep.yaml", "policy:\n  kind: always-leave\n")?;
            jail.set_env("SLOWLANE_ENV", "sweep");

            let config = SlowlaneConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.policy, PolicyConfig::AlwaysLeave);
            Ok(())
        });
    }

    #[test]
    fn load_from_path_reads_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "telemetry:\n  log_level: debug\n  metrics: true\n")?;
            let config = SlowlaneConfig::load_from_path("custom.yaml").map_err(|e| e.to_string())?;
            assert!(config.telemetry.metrics);
            assert_eq!(config.telemetry.log_level, "debug");
            Ok(())
        });
    }
}
