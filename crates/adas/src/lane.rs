//! Lane summary supplied by the lane module

use serde::{Deserialize, Serialize};

/// Per-frame lane state, already temporally smoothed upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneSummary {
    /// Lane detection confidence in [0, 1]
    pub confidence: f64,

    /// Signed lateral offset from lane center (meters, positive = right)
    pub offset_m: f64,

    /// Departing from lane
    pub departing: bool,

    /// Turn signal active
    #[serde(default)]
    pub signal_active: bool,
}

impl LaneSummary {
    /// Confidence in [0, 1] and a finite offset
    pub fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence) && self.offset_m.is_finite()
    }
}
