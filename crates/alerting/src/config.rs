//! Alert configuration

use serde::{Deserialize, Serialize};

use crate::alert::AlertKind;
use crate::AlertError;

/// Per-kind cooldowns between duplicate alerts (seconds of stream time)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub forward_collision_s: f64,
    pub lane_departure_s: f64,
    pub drowsiness_s: f64,
    /// Every other kind
    pub default_s: f64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            forward_collision_s: 3.0,
            lane_departure_s: 5.0,
            drowsiness_s: 10.0,
            default_s: 5.0,
        }
    }
}

impl CooldownConfig {
    pub fn for_kind(&self, kind: AlertKind) -> f64 {
        match kind {
            AlertKind::ForwardCollision => self.forward_collision_s,
            AlertKind::LaneDeparture => self.lane_departure_s,
            AlertKind::Drowsiness => self.drowsiness_s,
            AlertKind::PedestrianProximity | AlertKind::Headway | AlertKind::SpeedViolation => {
                self.default_s
            }
        }
    }
}

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub cooldowns: CooldownConfig,

    /// Pedestrian nearer than this raises an alert (meters)
    pub pedestrian_distance_m: f64,

    /// Headway below this is a warning (seconds)
    pub headway_warning_s: f64,

    /// Headway below this is critical (seconds)
    pub headway_critical_s: f64,

    /// Headway is only judged above this ego speed (km/h)
    pub headway_min_speed_kmh: f64,

    /// Central share of the frame width treated as the ego lane
    pub ego_lane_band: f64,

    /// Speed above the posted limit tolerated before alerting (km/h)
    pub speed_tolerance_kmh: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldowns: CooldownConfig::default(),
            pedestrian_distance_m: 10.0,
            headway_warning_s: 1.0,
            headway_critical_s: 0.6,
            headway_min_speed_kmh: 20.0,
            ego_lane_band: 0.4,
            speed_tolerance_kmh: 10.0,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), AlertError> {
        for kind in AlertKind::ALL {
            let cooldown = self.cooldowns.for_kind(kind);
            if !(cooldown.is_finite() && cooldown >= 0.0) {
                return Err(AlertError::InvalidConfig(format!(
                    "cooldown for {kind} must be finite and >= 0, got {cooldown}"
                )));
            }
        }
        if !(self.pedestrian_distance_m > 0.0) {
            return Err(AlertError::InvalidConfig("pedestrian_distance_m must be > 0".into()));
        }
        if !(0.0 < self.headway_critical_s && self.headway_critical_s < self.headway_warning_s) {
            return Err(AlertError::InvalidConfig(format!(
                "headway thresholds must be positive and increasing: {}, {}",
                self.headway_critical_s, self.headway_warning_s
            )));
        }
        if !(self.ego_lane_band > 0.0 && self.ego_lane_band <= 1.0) {
            return Err(AlertError::InvalidConfig("ego_lane_band must lie in (0, 1]".into()));
        }
        if !(self.speed_tolerance_kmh >= 0.0 && self.headway_min_speed_kmh >= 0.0) {
            return Err(AlertError::InvalidConfig("speed thresholds must be >= 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cooldowns() {
        let cooldowns = CooldownConfig::default();
        assert_eq!(cooldowns.for_kind(AlertKind::ForwardCollision), 3.0);
        assert_eq!(cooldowns.for_kind(AlertKind::LaneDeparture), 5.0);
        assert_eq!(cooldowns.for_kind(AlertKind::Drowsiness), 10.0);
        assert_eq!(cooldowns.for_kind(AlertKind::SpeedViolation), 5.0);
        assert!(AlertConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_headway() {
        let config = AlertConfig {
            headway_critical_s: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
