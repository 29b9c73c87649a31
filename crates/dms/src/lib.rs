//! Driver Monitoring System (DMS)
//!
//! Driver state as delivered by the (external) face-landmark stage:
//! - Alertness proxy (normalised eye openness)
//! - Drowsy, yawning and head-down indicators
//! - Per-sample alertness penalty and drowsiness levels

pub mod analysis;
pub mod config;
pub mod state;

pub use analysis::{alertness_penalty, DriverAssessment};
pub use config::DmsConfig;
pub use state::{DriverSummary, DrowsinessLevel};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),
}
