//! Tracker configuration

use serde::{Deserialize, Serialize};

use crate::TrackerError;

/// Noise model of the constant-velocity box filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanNoise {
    /// Initial variance of center, area and aspect
    pub initial_position_variance: f64,

    /// Initial variance of the (unobserved) velocities
    pub initial_velocity_variance: f64,

    /// Process noise added to center, area and aspect per frame
    pub process_position: f64,

    /// Process noise added to center velocities per frame
    pub process_velocity: f64,

    /// Process noise added to area/aspect velocities per frame
    pub process_shape_velocity: f64,

    /// Measurement noise of the box center
    pub measurement_position: f64,

    /// Measurement noise of box area and aspect
    pub measurement_shape: f64,
}

impl Default for KalmanNoise {
    fn default() -> Self {
        Self {
            initial_position_variance: 10.0,
            initial_velocity_variance: 10_000.0,
            process_position: 1.0,
            process_velocity: 0.01,
            process_shape_velocity: 0.0001,
            measurement_position: 1.0,
            measurement_shape: 10.0,
        }
    }
}

/// Tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Detections at or above this confidence take part in the primary pass
    pub high_confidence: f64,

    /// Detections below this confidence are ignored entirely
    pub low_confidence_floor: f64,

    /// Minimum IoU for a primary (high-confidence) match
    pub match_iou_threshold: f64,

    /// Minimum IoU for a low-confidence recovery match
    pub recovery_iou_threshold: f64,

    /// Hits needed to promote a Tentative track
    pub min_hits: u32,

    /// Frames without a match before a track is Removed
    pub max_age: u32,

    /// Frames a Lost track stays visible downstream
    pub lost_visibility_frames: u32,

    /// Distance samples retained per track
    pub distance_history_len: usize,

    /// Kalman noise model
    pub noise: KalmanNoise,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            high_confidence: 0.5,
            low_confidence_floor: 0.1,
            match_iou_threshold: 0.3,
            recovery_iou_threshold: 0.8,
            min_hits: 3,
            max_age: 30,
            lost_visibility_frames: 10,
            distance_history_len: 8,
            noise: KalmanNoise::default(),
        }
    }
}

impl TrackerConfig {
    /// Check thresholds for consistency
    pub fn validate(&self) -> Result<(), TrackerError> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(TrackerError::InvalidConfig(format!("{name} must lie in [0, 1], got {v}")))
            }
        };
        unit("high_confidence", self.high_confidence)?;
        unit("low_confidence_floor", self.low_confidence_floor)?;

        for (name, v) in [
            ("match_iou_threshold", self.match_iou_threshold),
            ("recovery_iou_threshold", self.recovery_iou_threshold),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(TrackerError::InvalidConfig(format!(
                    "{name} must lie in (0, 1], got {v}"
                )));
            }
        }

        if self.low_confidence_floor > self.high_confidence {
            return Err(TrackerError::InvalidConfig(
                "low_confidence_floor exceeds high_confidence".into(),
            ));
        }
        if self.min_hits == 0 {
            return Err(TrackerError::InvalidConfig("min_hits must be > 0".into()));
        }
        if self.distance_history_len < 3 {
            return Err(TrackerError::InvalidConfig(
                "distance_history_len must hold at least 3 samples".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_iou() {
        let config = TrackerConfig {
            match_iou_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_confidence_split() {
        let config = TrackerConfig {
            low_confidence_floor: 0.6,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
