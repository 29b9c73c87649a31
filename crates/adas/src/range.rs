//! Monocular range, closing speed and time-to-collision

use serde::{Deserialize, Serialize};
use tracing::debug;
use tracker::{BoundingBox, DistanceSample, TrackId, TrackStatus, TrackView};

use crate::config::{Calibration, RangeConfig};
use crate::object::{ObjectClass, ReferenceSize};
use crate::AdasError;

/// Risk tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    #[default]
    Safe,
    Caution,
    Danger,
    Critical,
}

/// Per-frame ranged view of a visible track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTrack {
    pub track_id: TrackId,

    pub bbox: BoundingBox,

    pub class: ObjectClass,

    pub status: TrackStatus,

    /// Frame this estimate belongs to
    pub frame: u64,

    /// Estimated distance (meters); absent when the box is too small to range
    pub distance_m: Option<f64>,

    /// Relative velocity (m/s), negative while closing
    pub velocity_mps: Option<f64>,

    /// Relative acceleration (m/s²)
    pub acceleration_mps2: Option<f64>,

    /// Time to collision (seconds), only while closing
    pub ttc_s: Option<f64>,

    /// Worse of the distance tier and TTC tier
    pub risk: RiskTier,

    /// Velocity is known and negative
    pub approaching: bool,
}

/// Stateless range estimator for one session's calibration
#[derive(Debug, Clone)]
pub struct RangeEstimator {
    config: RangeConfig,
    calibration: Calibration,
}

impl RangeEstimator {
    pub fn new(config: RangeConfig, calibration: Calibration) -> Result<Self, AdasError> {
        config.validate()?;
        calibration.validate()?;
        Ok(Self { config, calibration })
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Distance to an object from its box, or `None` for unrangeable boxes
    pub fn distance(&self, class: ObjectClass, bbox: &BoundingBox, frame_height: f64) -> Option<f64> {
        let height_px = bbox.height();
        if !(height_px.is_finite() && height_px >= self.config.min_box_height_px) {
            debug!(class = %class, height_px, "Box too small to range");
            return None;
        }

        if self.config.ground_plane_fallback && bbox.y1 <= 0.0 {
            // Top edge clipped: the box height under-reports the object,
            // the ground contact row is still reliable
            let horizon = frame_height / 2.0;
            let below_horizon = bbox.y2 - horizon;
            if below_horizon >= self.config.min_box_height_px && self.calibration.mount_height_m > 0.0 {
                return finite_positive(
                    self.calibration.focal_length_px * self.calibration.mount_height_m / below_horizon,
                );
            }
        }

        let reference = ReferenceSize::for_class(class);
        finite_positive(reference.height_m * self.calibration.focal_length_px / height_px)
    }

    /// Range sample for a track matched on `frame_number`
    pub fn sample(&self, track: &TrackView, frame_height: f64, frame_number: u64) -> Option<DistanceSample> {
        if !track.is_fresh() {
            return None;
        }
        self.distance(track.class, &track.bbox, frame_height)
            .map(|distance_m| DistanceSample { frame: frame_number, distance_m })
    }

    /// Range, kinematics and risk tier of one track on `frame_number`
    pub fn estimate(&self, track: &TrackView, frame_height: f64, frame_number: u64) -> EnrichedTrack {
        let history = &track.distance_history;

        // A sample recorded for this very frame is the current range
        let distance_m = match history.last() {
            Some(last) if last.frame == frame_number => Some(last.distance_m),
            _ => self.distance(track.class, &track.bbox, frame_height),
        };

        let (velocity_mps, acceleration_mps2) = kinematics(history, self.calibration.fps);
        let ttc_s = time_to_collision(distance_m, velocity_mps);

        let thresholds = &self.config.thresholds;
        let by_distance = distance_m.map_or(RiskTier::Safe, |d| thresholds.distance_tier(d));
        let by_ttc = ttc_s.map_or(RiskTier::Safe, |t| thresholds.ttc_tier(t));

        EnrichedTrack {
            track_id: track.id,
            bbox: track.bbox,
            class: track.class,
            status: track.status,
            frame: frame_number,
            distance_m,
            velocity_mps,
            acceleration_mps2,
            ttc_s,
            risk: by_distance.max(by_ttc),
            approaching: velocity_mps.is_some_and(|v| v < 0.0),
        }
    }
}

/// Velocity from the last two samples, acceleration from the last two velocities
pub fn kinematics(history: &[DistanceSample], fps: f64) -> (Option<f64>, Option<f64>) {
    let n = history.len();
    if n < 2 {
        return (None, None);
    }

    let velocity = rate(&history[n - 2], &history[n - 1], fps);
    let acceleration = if n >= 3 {
        let previous = rate(&history[n - 3], &history[n - 2], fps);
        match (previous, velocity) {
            (Some(v0), Some(v1)) => {
                let dt = elapsed_s(&history[n - 2], &history[n - 1], fps);
                dt.and_then(|dt| finite((v1 - v0) / dt))
            }
            _ => None,
        }
    } else {
        None
    };

    (velocity, acceleration)
}

/// Defined only while closing (`velocity < 0`)
pub fn time_to_collision(distance_m: Option<f64>, velocity_mps: Option<f64>) -> Option<f64> {
    match (distance_m, velocity_mps) {
        (Some(d), Some(v)) if v < 0.0 => finite(d / -v),
        _ => None,
    }
}

fn rate(a: &DistanceSample, b: &DistanceSample, fps: f64) -> Option<f64> {
    let dt = elapsed_s(a, b, fps)?;
    finite((b.distance_m - a.distance_m) / dt)
}

fn elapsed_s(a: &DistanceSample, b: &DistanceSample, fps: f64) -> Option<f64> {
    if b.frame <= a.frame {
        return None;
    }
    Some((b.frame - a.frame) as f64 / fps)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn finite_positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}
