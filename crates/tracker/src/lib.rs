//! Kinematic Tracker
//!
//! Turns independent per-frame detections into persistent object tracks:
//! - Constant-velocity Kalman filter over box center, area and aspect ratio
//! - Optimal IoU assignment (Hungarian) between predictions and detections
//! - Two-tier association: high-confidence first, low-confidence recovery
//! - Tentative / Confirmed / Lost / Removed lifecycle

pub mod assignment;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod kalman;
pub mod track;
mod tracker;

pub use assignment::{associate, linear_sum_assignment, Association};
pub use bbox::BoundingBox;
pub use config::{KalmanNoise, TrackerConfig};
pub use detection::{Detection, ObjectClass};
pub use kalman::KalmanBoxFilter;
pub use track::{DistanceSample, TrackId, TrackStatus, TrackView};
pub use tracker::Tracker;

use thiserror::Error;

/// Tracker error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Innovation covariance is not positive definite")]
    IllConditioned,

    #[error("Kalman state became non-finite")]
    NonFiniteState,

    #[error("Invalid tracker configuration: {0}")]
    InvalidConfig(String),
}
