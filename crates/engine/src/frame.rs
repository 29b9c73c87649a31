//! Per-frame input and output records

use adas::{EnrichedTrack, LaneSummary, VehicleSummary};
use alerting::Alert;
use dms::DriverSummary;
use event_fusion::{ContextState, SessionId};
use serde::{Deserialize, Serialize};
use tracker::Detection;

/// Everything the perception stage supplies for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Frame index within the session
    pub frame: u64,

    #[serde(default)]
    pub detections: Vec<Detection>,

    #[serde(default)]
    pub lane: LaneSummary,

    #[serde(default)]
    pub driver: DriverSummary,

    /// Ego speed and recognised signs, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleSummary>,
}

impl FrameInput {
    pub fn new(frame: u64, detections: Vec<Detection>) -> Self {
        Self {
            frame,
            detections,
            ..Default::default()
        }
    }
}

/// Window scores and sustained flags after a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextScores {
    pub lane_stability: f64,
    pub traffic_density: f64,
    pub driver_alertness: f64,
    pub sustained_lane_departure: bool,
    pub critical_proximity: bool,
}

impl From<&ContextState> for ContextScores {
    fn from(state: &ContextState) -> Self {
        Self {
            lane_stability: state.lane_stability(),
            traffic_density: state.traffic_density(),
            driver_alertness: state.driver_alertness(),
            sustained_lane_departure: state.sustained_lane_departure(),
            critical_proximity: state.critical_proximity(),
        }
    }
}

/// Result of one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    pub frame: u64,

    /// Visible tracks with range and risk
    pub tracks: Vec<EnrichedTrack>,

    /// Alerts newly emitted on this frame, most severe first
    pub alerts: Vec<Alert>,

    pub context: ContextScores,
}

/// Totals of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session: SessionId,
    pub frames_processed: u64,
    pub alerts_emitted: usize,
    /// Ledger entries never acknowledged since their last emission
    pub alerts_unacknowledged: usize,
}
