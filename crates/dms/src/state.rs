//! Driver state samples

use serde::{Deserialize, Serialize};

/// Drowsiness level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrowsinessLevel {
    #[default]
    Normal,
    Mild,
    Moderate,
    High,
}

/// Per-frame driver summary, already smoothed by the driver module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    /// Alertness proxy in [0, 1] (normalised eye aspect ratio; 1 = wide awake)
    pub alertness: f64,

    /// Drowsiness indicator
    #[serde(default)]
    pub drowsy: bool,

    /// Driver yawning
    #[serde(default)]
    pub yawning: bool,

    /// Driver head tilted down
    #[serde(default)]
    pub head_down: bool,
}

impl Default for DriverSummary {
    fn default() -> Self {
        Self {
            alertness: 1.0,
            drowsy: false,
            yawning: false,
            head_down: false,
        }
    }
}

impl DriverSummary {
    /// Alertness proxy lies in [0, 1]
    pub fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.alertness)
    }
}
