//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::DmsError;

/// Alertness scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Alertness proxy below this counts as eyes closing
    pub low_alertness_threshold: f64,

    /// Penalty weight of a drowsy / low-alertness sample
    pub drowsy_weight: f64,

    /// Penalty weight of a yawning sample
    pub yawn_weight: f64,

    /// Penalty weight of a head-down sample
    pub head_down_weight: f64,

    /// Window alertness score below this raises a drowsiness warning
    pub warning_score: f64,

    /// Window alertness score below this is critical
    pub critical_score: f64,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            low_alertness_threshold: 0.3,
            drowsy_weight: 0.5,
            yawn_weight: 0.2,
            head_down_weight: 0.3,
            warning_score: 0.6,
            critical_score: 0.35,
        }
    }
}

impl DmsConfig {
    pub fn validate(&self) -> Result<(), DmsError> {
        let weights = [self.drowsy_weight, self.yawn_weight, self.head_down_weight];
        if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(DmsError::Config("penalty weights must be finite and >= 0".into()));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || total > 1.0 + 1e-9 {
            return Err(DmsError::Config(format!(
                "penalty weights must sum to (0, 1], got {total}"
            )));
        }
        if !(0.0 < self.critical_score && self.critical_score < self.warning_score && self.warning_score <= 1.0) {
            return Err(DmsError::Config(format!(
                "expected 0 < critical_score < warning_score <= 1, got {} / {}",
                self.critical_score, self.warning_score
            )));
        }
        Ok(())
    }
}
