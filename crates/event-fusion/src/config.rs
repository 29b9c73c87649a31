//! Context aggregation configuration

use adas::RiskThresholds;
use dms::DmsConfig;
use serde::{Deserialize, Serialize};

use crate::FusionError;

/// Longest rolling window a configuration may ask for
pub const MAX_WINDOW_SECONDS: f64 = 60.0;

/// Context aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Rolling window length (seconds)
    pub window_seconds: f64,

    /// Weight of mean lane confidence in lane stability (rest: offset steadiness)
    pub lane_confidence_weight: f64,

    /// Offset variance mapped to full instability (m²)
    pub lane_offset_variance_scale: f64,

    /// Mean object count mapped to full traffic density
    pub max_object_count: f64,

    /// Share of departing samples that makes a departure sustained
    pub departure_majority: f64,

    /// Evidence needed before a sustained condition can hold (seconds)
    pub min_sustained_seconds: f64,

    /// Driver alertness scoring
    pub driver: DmsConfig,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_seconds: 5.0,
            lane_confidence_weight: 0.6,
            lane_offset_variance_scale: 0.25,
            max_object_count: 10.0,
            departure_majority: 0.5,
            min_sustained_seconds: 1.0,
            driver: DmsConfig::default(),
        }
    }
}

impl ContextConfig {
    /// Window capacity in samples at `fps`
    pub fn window_capacity(&self, fps: f64) -> usize {
        ((self.window_seconds * fps).ceil() as usize).max(1)
    }

    /// Samples needed before a sustained condition may hold at `fps`
    pub fn min_sustained_samples(&self, fps: f64) -> usize {
        ((self.min_sustained_seconds * fps).ceil() as usize)
            .max(1)
            .min(self.window_capacity(fps))
    }

    pub fn validate(&self, thresholds: &RiskThresholds) -> Result<(), FusionError> {
        let positive = [
            ("window_seconds", self.window_seconds),
            ("lane_offset_variance_scale", self.lane_offset_variance_scale),
            ("max_object_count", self.max_object_count),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FusionError::InvalidConfig(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if self.window_seconds > MAX_WINDOW_SECONDS {
            return Err(FusionError::InvalidConfig(format!(
                "window_seconds must be at most {MAX_WINDOW_SECONDS}, got {}",
                self.window_seconds
            )));
        }
        for (name, value) in [
            ("lane_confidence_weight", self.lane_confidence_weight),
            ("departure_majority", self.departure_majority),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FusionError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        if !(self.min_sustained_seconds >= 0.0) {
            return Err(FusionError::InvalidConfig("min_sustained_seconds must be >= 0".into()));
        }
        self.driver
            .validate()
            .map_err(|e| FusionError::InvalidConfig(e.to_string()))?;
        thresholds
            .validate()
            .map_err(|e| FusionError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_capacity() {
        let config = ContextConfig::default();
        assert_eq!(config.window_capacity(30.0), 150);
        assert_eq!(config.min_sustained_samples(30.0), 30);
        assert_eq!(config.window_capacity(29.97), 150);
    }

    #[test]
    fn test_rejects_out_of_range_window() {
        for window_seconds in [0.0, MAX_WINDOW_SECONDS + 1.0, f64::INFINITY] {
            let config = ContextConfig {
                window_seconds,
                ..Default::default()
            };
            assert!(config.validate(&RiskThresholds::default()).is_err());
        }
    }
}
