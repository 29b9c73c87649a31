//! Alert model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracker::TrackId;

/// Closed set of alert kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ForwardCollision,
    LaneDeparture,
    Drowsiness,
    PedestrianProximity,
    Headway,
    SpeedViolation,
}

impl AlertKind {
    pub const ALL: [AlertKind; 6] = [
        AlertKind::ForwardCollision,
        AlertKind::LaneDeparture,
        AlertKind::Drowsiness,
        AlertKind::PedestrianProximity,
        AlertKind::Headway,
        AlertKind::SpeedViolation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::ForwardCollision => "forward_collision",
            AlertKind::LaneDeparture => "lane_departure",
            AlertKind::Drowsiness => "drowsiness",
            AlertKind::PedestrianProximity => "pedestrian_proximity",
            AlertKind::Headway => "headway",
            AlertKind::SpeedViolation => "speed_violation",
        }
    }

    /// Whether the dedup key carries the track id
    pub fn is_track_scoped(&self) -> bool {
        match self {
            AlertKind::ForwardCollision | AlertKind::PedestrianProximity | AlertKind::Headway => true,
            AlertKind::LaneDeparture | AlertKind::Drowsiness | AlertKind::SpeedViolation => false,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Emitted alert; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,

    pub severity: AlertSeverity,

    /// Risk score in [0, 1]
    pub risk_score: f64,

    /// Numbers that triggered the alert (distance, TTC, offset, ...)
    pub metadata: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<TrackId>,

    /// Frame index of emission
    pub frame: u64,

    /// Stream time of emission (seconds)
    pub timestamp_s: f64,
}

impl Alert {
    pub fn new(kind: AlertKind, severity: AlertSeverity, risk_score: f64) -> Self {
        Self {
            kind,
            severity,
            risk_score: risk_score.clamp(0.0, 1.0),
            metadata: BTreeMap::new(),
            track_id: None,
            frame: 0,
            timestamp_s: 0.0,
        }
    }

    pub fn with_track(mut self, track_id: TrackId) -> Self {
        self.track_id = Some(track_id);
        self
    }

    /// Attach a metadata value; non-finite values are skipped
    pub fn with_value(self, key: &str, value: f64) -> Self {
        self.with_optional(key, Some(value))
    }

    pub fn with_optional(mut self, key: &str, value: Option<f64>) -> Self {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            self.metadata.insert(key.to_string(), value);
        }
        self
    }

    pub(crate) fn stamped(mut self, frame: u64, timestamp_s: f64) -> Self {
        self.frame = frame;
        self.timestamp_s = timestamp_s;
        self
    }
}
