//! ADAS configuration

use serde::{Deserialize, Serialize};

use crate::range::RiskTier;
use crate::AdasError;

/// Highest frame rate a session may declare
pub const MAX_FPS: f64 = 1000.0;

/// Per-session camera calibration, fixed at session start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibration {
    /// Frame rate of the session (frames per second)
    pub fps: f64,

    /// Focal length (pixels)
    pub focal_length_px: f64,

    /// Camera height above the road (meters)
    pub mount_height_m: f64,

    /// Frame width (pixels)
    pub frame_width: f64,

    /// Frame height (pixels)
    pub frame_height: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            fps: 30.0,
            focal_length_px: 700.0,
            mount_height_m: 1.2,
            frame_width: 1280.0,
            frame_height: 720.0,
        }
    }
}

impl Calibration {
    /// Reject non-physical calibration values
    pub fn validate(&self) -> Result<(), AdasError> {
        let positive = [
            ("fps", self.fps),
            ("focal_length_px", self.focal_length_px),
            ("frame_width", self.frame_width),
            ("frame_height", self.frame_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AdasError::InvalidCalibration(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if self.fps > MAX_FPS {
            return Err(AdasError::InvalidCalibration(format!(
                "fps must be at most {MAX_FPS}, got {}",
                self.fps
            )));
        }
        if !(self.mount_height_m.is_finite() && self.mount_height_m >= 0.0) {
            return Err(AdasError::InvalidCalibration(format!(
                "mount_height_m must be finite and >= 0, got {}",
                self.mount_height_m
            )));
        }
        Ok(())
    }
}

/// Distance and TTC cut-offs shared by ranging, context and alerting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub critical_distance_m: f64,
    pub danger_distance_m: f64,
    pub caution_distance_m: f64,
    pub critical_ttc_s: f64,
    pub danger_ttc_s: f64,
    pub caution_ttc_s: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_distance_m: 3.0,
            danger_distance_m: 7.0,
            caution_distance_m: 15.0,
            critical_ttc_s: 0.5,
            danger_ttc_s: 1.5,
            caution_ttc_s: 3.0,
        }
    }
}

impl RiskThresholds {
    /// Tier by absolute distance
    pub fn distance_tier(&self, distance_m: f64) -> RiskTier {
        Self::ladder(
            distance_m,
            self.critical_distance_m,
            self.danger_distance_m,
            self.caution_distance_m,
        )
    }

    /// Tier by time-to-collision
    pub fn ttc_tier(&self, ttc_s: f64) -> RiskTier {
        Self::ladder(ttc_s, self.critical_ttc_s, self.danger_ttc_s, self.caution_ttc_s)
    }

    /// Distance or TTC at danger level or worse
    pub fn is_dangerous(&self, distance_m: Option<f64>, ttc_s: Option<f64>) -> bool {
        distance_m.is_some_and(|d| d < self.danger_distance_m)
            || ttc_s.is_some_and(|t| t < self.danger_ttc_s)
    }

    fn ladder(value: f64, critical: f64, danger: f64, caution: f64) -> RiskTier {
        if value < critical {
            RiskTier::Critical
        } else if value < danger {
            RiskTier::Danger
        } else if value < caution {
            RiskTier::Caution
        } else {
            RiskTier::Safe
        }
    }

    pub fn validate(&self) -> Result<(), AdasError> {
        let ordered = |name: &str, a: f64, b: f64, c: f64| {
            if 0.0 < a && a < b && b < c {
                Ok(())
            } else {
                Err(AdasError::InvalidConfig(format!(
                    "{name} thresholds must be positive and increasing: {a}, {b}, {c}"
                )))
            }
        };
        ordered(
            "distance",
            self.critical_distance_m,
            self.danger_distance_m,
            self.caution_distance_m,
        )?;
        ordered("ttc", self.critical_ttc_s, self.danger_ttc_s, self.caution_ttc_s)
    }
}

/// Range estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Risk tier cut-offs
    pub thresholds: RiskThresholds,

    /// Boxes shorter than this are too small to range (pixels)
    pub min_box_height_px: f64,

    /// Range top-truncated boxes from their ground contact row
    pub ground_plane_fallback: bool,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            min_box_height_px: 2.0,
            ground_plane_fallback: true,
        }
    }
}

impl RangeConfig {
    pub fn validate(&self) -> Result<(), AdasError> {
        if !(self.min_box_height_px.is_finite() && self.min_box_height_px > 0.0) {
            return Err(AdasError::InvalidConfig(
                "min_box_height_px must be > 0".into(),
            ));
        }
        self.thresholds.validate()
    }
}
