//! Layered engine configuration

use std::path::Path;

use adas::{RangeConfig, RiskThresholds};
use alerting::AlertConfig;
use event_fusion::ContextConfig;
use serde::{Deserialize, Serialize};
use tracker::TrackerConfig;

use crate::EngineError;

/// Environment prefix, e.g. `SAFETY_TRACKER__MAX_AGE=45`
pub const ENV_PREFIX: &str = "SAFETY";

/// Configuration of every pipeline stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tracker: TrackerConfig,

    /// Ranging; its thresholds are shared by context and alerting
    pub range: RangeConfig,

    pub context: ContextConfig,

    pub alerts: AlertConfig,
}

impl EngineConfig {
    /// Defaults, then an optional file, then `SAFETY_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        Self::load_layers(path, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layers(path: Option<&Path>, environment: config::Environment) -> Result<Self, EngineError> {
        let defaults = config::Config::try_from(&EngineConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(environment);

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.range.thresholds
    }

    /// Reject inconsistent thresholds across all stages
    pub fn validate(&self) -> Result<(), EngineError> {
        self.tracker.validate()?;
        self.range.validate()?;
        self.context.validate(self.thresholds())?;
        self.alerts.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tracker.max_age, 30);
        assert_eq!(config.alerts.cooldowns.forward_collision_s, 3.0);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("safety-engine-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[tracker]\nmax_age = 45\nrecovery_iou_threshold = 0.6\n").unwrap();
        writeln!(file, "[alerts.cooldowns]\ndrowsiness_s = 20.0").unwrap();
        drop(file);

        let config = EngineConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.tracker.max_age, 45);
        assert_eq!(config.tracker.recovery_iou_threshold, 0.6);
        assert_eq!(config.tracker.min_hits, 3);
        assert_eq!(config.alerts.cooldowns.drowsiness_s, 20.0);
        assert_eq!(config.context.window_seconds, 5.0);
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let vars: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::environment().source(Some(vars))
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = std::env::temp_dir().join(format!("safety-engine-env-{}.toml", std::process::id()));
        std::fs::write(&path, "[tracker]\nmax_age = 45\n").unwrap();

        let config = EngineConfig::load_layers(
            Some(&path),
            env(&[
                ("SAFETY_TRACKER__MAX_AGE", "60"),
                ("SAFETY_ALERTS__COOLDOWNS__DROWSINESS_S", "12.5"),
                ("UNRELATED_TRACKER__MAX_AGE", "7"),
            ]),
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.tracker.max_age, 60);
        assert_eq!(config.alerts.cooldowns.drowsiness_s, 12.5);
        assert_eq!(config.tracker.min_hits, 3);
    }

    #[test]
    fn test_environment_values_are_validated() {
        let result = EngineConfig::load_layers(
            None,
            env(&[("SAFETY_RANGE__THRESHOLDS__DANGER_DISTANCE_M", "20.0")]),
        );
        assert!(matches!(result, Err(EngineError::Adas(_))));
    }

    #[test]
    fn test_rejects_non_monotonic_ladder() {
        let mut config = EngineConfig::default();
        config.range.thresholds.danger_distance_m = 20.0;
        assert!(config.validate().is_err());
    }
}
