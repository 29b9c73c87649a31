//! Advanced Driver Assistance System (ADAS)
//!
//! Road scene ranging on top of tracked objects:
//! - Monocular distance from reference object sizes
//! - Closing speed and acceleration from distance history
//! - Time-to-collision and risk tiers
//! - Lane, traffic sign and ego-vehicle inputs for downstream fusion

pub mod analysis;
pub mod config;
pub mod lane;
pub mod object;
pub mod range;
pub mod sign;

pub use analysis::SceneSummary;
pub use config::{Calibration, RangeConfig, RiskThresholds, MAX_FPS};
pub use lane::LaneSummary;
pub use object::{ObjectClass, ReferenceSize};
pub use range::{EnrichedTrack, RangeEstimator, RiskTier};
pub use sign::{TrafficSign, VehicleSummary};

use thiserror::Error;

/// ADAS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdasError {
    #[error("Invalid camera calibration: {0}")]
    InvalidCalibration(String),

    #[error("Invalid range configuration: {0}")]
    InvalidConfig(String),
}
