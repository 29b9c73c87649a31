//! Traffic signs and ego-vehicle state

use serde::{Deserialize, Serialize};

/// Traffic sign types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficSign {
    /// Speed limit (km/h)
    SpeedLimit(u32),
    /// Stop sign
    Stop,
    /// Yield sign
    Yield,
    /// No entry
    NoEntry,
    /// No overtaking
    NoOvertaking,
    /// End of restriction
    EndRestriction,
    /// Unknown sign
    Unknown,
}

/// Ego-vehicle state for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    /// Measured ego speed (km/h), if known
    #[serde(default)]
    pub speed_kmh: Option<f64>,

    /// Signs recognised on this frame
    #[serde(default)]
    pub signs: Vec<TrafficSign>,
}

impl VehicleSummary {
    /// Last speed-limit sign recognised on this frame
    pub fn speed_limit_kmh(&self) -> Option<u32> {
        self.signs.iter().rev().find_map(|sign| match sign {
            TrafficSign::SpeedLimit(limit) if *limit > 0 => Some(*limit),
            _ => None,
        })
    }

    /// True when an end-of-restriction sign lifts the posted limit
    pub fn clears_limit(&self) -> bool {
        self.signs.contains(&TrafficSign::EndRestriction)
    }

    /// Ego speed if finite and non-negative
    pub fn valid_speed_kmh(&self) -> Option<f64> {
        self.speed_kmh.filter(|v| v.is_finite() && *v >= 0.0)
    }
}
