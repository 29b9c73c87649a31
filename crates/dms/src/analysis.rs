//! Alertness penalty and drowsiness grading

use serde::{Deserialize, Serialize};

use crate::config::DmsConfig;
use crate::state::{DriverSummary, DrowsinessLevel};

/// Penalty of a single sample in [0, 1]
pub fn alertness_penalty(sample: &DriverSummary, config: &DmsConfig) -> f64 {
    let eyes_closing = sample.drowsy || sample.alertness < config.low_alertness_threshold;

    let mut penalty = 0.0;
    if eyes_closing {
        penalty += config.drowsy_weight;
    }
    if sample.yawning {
        penalty += config.yawn_weight;
    }
    if sample.head_down {
        penalty += config.head_down_weight;
    }
    penalty.clamp(0.0, 1.0)
}

/// Driver state over a window of samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverAssessment {
    /// 1 - mean penalty, in [0, 1]
    pub alertness_score: f64,

    pub level: DrowsinessLevel,
}

impl DriverAssessment {
    /// Grade a window alertness score
    pub fn from_score(alertness_score: f64, config: &DmsConfig) -> Self {
        let level = if alertness_score < config.critical_score {
            DrowsinessLevel::High
        } else if alertness_score < config.warning_score {
            DrowsinessLevel::Moderate
        } else if alertness_score < (config.warning_score + 1.0) / 2.0 {
            DrowsinessLevel::Mild
        } else {
            DrowsinessLevel::Normal
        };
        Self { alertness_score, level }
    }

    /// Moderate or high drowsiness
    pub fn is_drowsy(&self) -> bool {
        self.level >= DrowsinessLevel::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_penalty_weights() {
        let config = DmsConfig::default();
        let alert = DriverSummary::default();
        assert_eq!(alertness_penalty(&alert, &config), 0.0);

        let closing = DriverSummary {
            alertness: 0.1,
            ..Default::default()
        };
        assert!((alertness_penalty(&closing, &config) - 0.5).abs() < 1e-12);

        let everything = DriverSummary {
            alertness: 0.1,
            drowsy: true,
            yawning: true,
            head_down: true,
        };
        assert!((alertness_penalty(&everything, &config) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_levels() {
        let config = DmsConfig::default();
        assert_eq!(DriverAssessment::from_score(0.95, &config).level, DrowsinessLevel::Normal);
        assert_eq!(DriverAssessment::from_score(0.7, &config).level, DrowsinessLevel::Mild);
        assert_eq!(DriverAssessment::from_score(0.5, &config).level, DrowsinessLevel::Moderate);
        assert_eq!(DriverAssessment::from_score(0.2, &config).level, DrowsinessLevel::High);
        assert!(DriverAssessment::from_score(0.5, &config).is_drowsy());
    }

    proptest! {
        #[test]
        fn prop_penalty_in_unit_range(
            alertness in 0.0..=1.0f64,
            drowsy: bool,
            yawning: bool,
            head_down: bool
        ) {
            let sample = DriverSummary { alertness, drowsy, yawning, head_down };
            let p = alertness_penalty(&sample, &DmsConfig::default());
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
