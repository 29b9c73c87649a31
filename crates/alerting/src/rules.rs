//! Candidate conditions evaluated on every frame
//!
//! Each rule reads numbers already produced upstream (risk tiers, window
//! scores, sustained flags) and returns an un-stamped candidate alert.

use adas::{EnrichedTrack, LaneSummary, RiskThresholds, RiskTier};
use event_fusion::ContextState;
use tracker::BoundingBox;

use crate::alert::{Alert, AlertKind, AlertSeverity};
use crate::config::AlertConfig;

/// Approaching non-pedestrian at danger tier or worse
pub fn forward_collision(track: &EnrichedTrack, thresholds: &RiskThresholds) -> Option<Alert> {
    if !track.approaching || track.class.is_pedestrian() {
        return None;
    }
    let severity = match track.risk {
        RiskTier::Critical => AlertSeverity::Critical,
        RiskTier::Danger => AlertSeverity::Warning,
        RiskTier::Caution | RiskTier::Safe => return None,
    };

    let by_ttc = track.ttc_s.map_or(0.0, |t| proximity(t, thresholds.caution_ttc_s));
    let by_distance = track
        .distance_m
        .map_or(0.0, |d| proximity(d, thresholds.caution_distance_m));

    Some(
        Alert::new(AlertKind::ForwardCollision, severity, by_ttc.max(by_distance))
            .with_track(track.track_id)
            .with_optional("distance_m", track.distance_m)
            .with_optional("ttc_s", track.ttc_s)
            .with_optional("velocity_mps", track.velocity_mps),
    )
}

/// Sustained departure without turn signal; escalated for a drowsy driver
pub fn lane_departure(context: &ContextState, lane: &LaneSummary) -> Option<Alert> {
    if !context.sustained_lane_departure() || lane.signal_active {
        return None;
    }
    let driver = context.driver_assessment();
    let severity = if driver.is_drowsy() {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };
    let offset = context.latest_lane().map(|s| s.offset_m);

    Some(
        Alert::new(AlertKind::LaneDeparture, severity, context.departure_ratio())
            .with_optional("offset_m", offset)
            .with_value("departure_ratio", context.departure_ratio())
            .with_value("lane_stability", context.lane_stability())
            .with_value("driver_alertness", driver.alertness_score),
    )
}

/// Window alertness below the warning score with enough evidence
pub fn drowsiness(context: &ContextState, alertness_proxy: Option<f64>) -> Option<Alert> {
    if context.driver_samples() < context.min_sustained_samples() {
        return None;
    }
    let driver = context.driver_assessment();
    if !driver.is_drowsy() {
        return None;
    }
    let severity = if driver.level == dms::DrowsinessLevel::High {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };

    Some(
        Alert::new(AlertKind::Drowsiness, severity, 1.0 - driver.alertness_score)
            .with_value("driver_alertness", driver.alertness_score)
            .with_optional("alertness_proxy", alertness_proxy),
    )
}

/// Pedestrian nearer than the proximity threshold
pub fn pedestrian_proximity(track: &EnrichedTrack, config: &AlertConfig) -> Option<Alert> {
    if !track.class.is_pedestrian() {
        return None;
    }
    let distance = track.distance_m.filter(|d| *d < config.pedestrian_distance_m)?;
    let severity = if track.risk >= RiskTier::Danger {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };

    Some(
        Alert::new(
            AlertKind::PedestrianProximity,
            severity,
            proximity(distance, config.pedestrian_distance_m),
        )
        .with_track(track.track_id)
        .with_value("distance_m", distance)
        .with_optional("ttc_s", track.ttc_s),
    )
}

/// Time gap to an in-path vehicle at the current ego speed
pub fn headway(
    track: &EnrichedTrack,
    ego_speed_kmh: Option<f64>,
    frame_width: f64,
    config: &AlertConfig,
) -> Option<Alert> {
    if !track.class.is_vehicle() || !in_ego_lane(&track.bbox, frame_width, config.ego_lane_band) {
        return None;
    }
    let speed_kmh = ego_speed_kmh.filter(|v| *v >= config.headway_min_speed_kmh && *v > 0.0)?;
    let distance = track.distance_m?;
    let headway_s = distance / (speed_kmh / 3.6);

    let severity = if headway_s < config.headway_critical_s {
        AlertSeverity::Critical
    } else if headway_s < config.headway_warning_s {
        AlertSeverity::Warning
    } else {
        return None;
    };

    Some(
        Alert::new(
            AlertKind::Headway,
            severity,
            proximity(headway_s, config.headway_warning_s),
        )
        .with_track(track.track_id)
        .with_value("headway_s", headway_s)
        .with_value("distance_m", distance)
        .with_value("speed_kmh", speed_kmh),
    )
}

/// Ego speed above the posted limit plus tolerance
pub fn speed_violation(context: &ContextState, config: &AlertConfig) -> Option<Alert> {
    let limit = f64::from(context.posted_speed_limit_kmh()?);
    let speed = context.ego_speed_kmh()?;
    let excess = speed - limit;
    if excess <= config.speed_tolerance_kmh {
        return None;
    }
    let severity = if excess > 2.0 * config.speed_tolerance_kmh {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };
    let score = if config.speed_tolerance_kmh > 0.0 {
        excess / (3.0 * config.speed_tolerance_kmh)
    } else {
        1.0
    };

    Some(
        Alert::new(AlertKind::SpeedViolation, severity, score)
            .with_value("speed_kmh", speed)
            .with_value("limit_kmh", limit)
            .with_value("excess_kmh", excess),
    )
}

/// 1 at zero, falling linearly to 0 at `limit`
fn proximity(value: f64, limit: f64) -> f64 {
    (1.0 - value / limit).clamp(0.0, 1.0)
}

fn in_ego_lane(bbox: &BoundingBox, frame_width: f64, band: f64) -> bool {
    let (cx, _) = bbox.center();
    let half = frame_width * band / 2.0;
    let mid = frame_width / 2.0;
    (mid - half..=mid + half).contains(&cx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adas::{ObjectClass, TrafficSign, VehicleSummary};
    use approx::assert_relative_eq;
    use dms::DriverSummary;
    use event_fusion::ContextConfig;
    use tracker::{TrackId, TrackStatus};

    fn track(class: ObjectClass, distance_m: f64, velocity: Option<f64>, cx: f64) -> EnrichedTrack {
        let thresholds = RiskThresholds::default();
        let ttc_s = adas::range::time_to_collision(Some(distance_m), velocity);
        let risk = thresholds
            .distance_tier(distance_m)
            .max(ttc_s.map_or(RiskTier::Safe, |t| thresholds.ttc_tier(t)));
        EnrichedTrack {
            track_id: TrackId(3),
            bbox: BoundingBox::from_center(cx, 400.0, 120.0, 100.0),
            class,
            status: TrackStatus::Confirmed,
            frame: 42,
            distance_m: Some(distance_m),
            velocity_mps: velocity,
            acceleration_mps2: None,
            ttc_s,
            risk,
            approaching: velocity.is_some_and(|v| v < 0.0),
        }
    }

    fn context() -> ContextState {
        ContextState::new(30.0, ContextConfig::default(), RiskThresholds::default())
    }

    #[test]
    fn test_forward_collision_severity_follows_tier() {
        let thresholds = RiskThresholds::default();

        // TTC 2 s: caution stays below the alert line
        assert!(forward_collision(&track(ObjectClass::Car, 20.0, Some(-10.0), 640.0), &thresholds).is_none());

        // TTC 1 s: danger
        let danger = forward_collision(&track(ObjectClass::Truck, 10.0, Some(-10.0), 640.0), &thresholds)
            .unwrap();
        assert_eq!(danger.severity, AlertSeverity::Warning);
        assert_relative_eq!(danger.risk_score, 1.0 - 1.0 / 3.0, epsilon = 1e-9);
        assert_eq!(danger.track_id, Some(TrackId(3)));

        // 2.5 m: critical by distance
        let critical = forward_collision(&track(ObjectClass::Car, 2.5, Some(-1.0), 640.0), &thresholds)
            .unwrap();
        assert_eq!(critical.severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_forward_collision_needs_closing_vehicle() {
        let thresholds = RiskThresholds::default();
        assert!(forward_collision(&track(ObjectClass::Car, 5.0, Some(2.0), 640.0), &thresholds).is_none());
        assert!(forward_collision(&track(ObjectClass::Car, 5.0, None, 640.0), &thresholds).is_none());
        assert!(
            forward_collision(&track(ObjectClass::Pedestrian, 5.0, Some(-3.0), 640.0), &thresholds)
                .is_none()
        );
        assert!(forward_collision(&track(ObjectClass::Car, 40.0, Some(-1.0), 640.0), &thresholds).is_none());
    }

    #[test]
    fn test_pedestrian_proximity() {
        let config = AlertConfig::default();
        let near = pedestrian_proximity(&track(ObjectClass::Pedestrian, 5.0, None, 300.0), &config).unwrap();
        assert_eq!(near.severity, AlertSeverity::Critical);
        assert_relative_eq!(near.risk_score, 0.5, epsilon = 1e-9);

        let warning = pedestrian_proximity(&track(ObjectClass::Pedestrian, 8.0, None, 300.0), &config).unwrap();
        assert_eq!(warning.severity, AlertSeverity::Warning);

        assert!(pedestrian_proximity(&track(ObjectClass::Pedestrian, 12.0, None, 300.0), &config).is_none());
        assert!(pedestrian_proximity(&track(ObjectClass::Car, 5.0, None, 300.0), &config).is_none());
    }

    #[test]
    fn test_headway_in_path_only() {
        let config = AlertConfig::default();
        // 72 km/h = 20 m/s, 10 m ahead: 0.5 s
        let close = headway(&track(ObjectClass::Car, 10.0, None, 640.0), Some(72.0), 1280.0, &config).unwrap();
        assert_eq!(close.severity, AlertSeverity::Critical);
        assert_relative_eq!(close.metadata["headway_s"], 0.5, epsilon = 1e-9);

        // 16 m: 0.8 s
        let warning = headway(&track(ObjectClass::Car, 16.0, None, 640.0), Some(72.0), 1280.0, &config).unwrap();
        assert_eq!(warning.severity, AlertSeverity::Warning);

        // Adjacent lane
        assert!(headway(&track(ObjectClass::Car, 10.0, None, 200.0), Some(72.0), 1280.0, &config).is_none());
        // Crawling in traffic
        assert!(headway(&track(ObjectClass::Car, 3.0, None, 640.0), Some(12.0), 1280.0, &config).is_none());
        // Unknown ego speed
        assert!(headway(&track(ObjectClass::Car, 3.0, None, 640.0), None, 1280.0, &config).is_none());
    }

    #[test]
    fn test_speed_violation() {
        let config = AlertConfig::default();
        let mut context = context();
        assert!(speed_violation(&context, &config).is_none());

        context.record_vehicle(&VehicleSummary {
            speed_kmh: Some(58.0),
            signs: vec![TrafficSign::SpeedLimit(50)],
        });
        assert!(speed_violation(&context, &config).is_none());

        context.record_vehicle(&VehicleSummary {
            speed_kmh: Some(65.0),
            signs: vec![],
        });
        let warning = speed_violation(&context, &config).unwrap();
        assert_eq!(warning.severity, AlertSeverity::Warning);
        assert_eq!(warning.metadata["limit_kmh"], 50.0);

        context.record_vehicle(&VehicleSummary {
            speed_kmh: Some(75.0),
            signs: vec![],
        });
        assert_eq!(speed_violation(&context, &config).unwrap().severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_lane_departure_rules() {
        let mut context = context();
        let departing = LaneSummary {
            confidence: 0.9,
            offset_m: 0.9,
            departing: true,
            signal_active: false,
        };
        for _ in 0..40 {
            context.push_lane(&departing);
            context.push_driver(&DriverSummary::default());
        }
        let alert = lane_departure(&context, &departing).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.metadata["offset_m"], 0.9);

        let signalling = LaneSummary {
            signal_active: true,
            ..departing.clone()
        };
        assert!(lane_departure(&context, &signalling).is_none());

        let asleep = DriverSummary {
            alertness: 0.1,
            drowsy: true,
            yawning: false,
            head_down: true,
        };
        for _ in 0..150 {
            context.push_driver(&asleep);
        }
        assert_eq!(
            lane_departure(&context, &departing).unwrap().severity,
            AlertSeverity::Critical
        );
    }

    #[test]
    fn test_drowsiness_needs_evidence() {
        let mut context = context();
        let asleep = DriverSummary {
            alertness: 0.1,
            drowsy: true,
            yawning: true,
            head_down: false,
        };
        for _ in 0..29 {
            context.push_driver(&asleep);
        }
        assert!(drowsiness(&context, Some(0.1)).is_none());
        context.push_driver(&asleep);

        // Penalty 0.7 on every sample: alertness 0.3, below critical 0.35
        let alert = drowsiness(&context, Some(0.1)).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_relative_eq!(alert.risk_score, 0.7, epsilon = 1e-9);
    }
}
