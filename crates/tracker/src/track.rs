//! Track identity, lifecycle and the downstream view

use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bbox::BoundingBox;
use crate::config::TrackerConfig;
use crate::detection::{Detection, ObjectClass};
use crate::kalman::KalmanBoxFilter;
use crate::TrackerError;

/// Track identity, unique per session and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Track lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    /// Seen fewer than `min_hits` times
    Tentative,
    /// Matched on the latest frame after promotion
    Confirmed,
    /// Confirmed earlier, missed on the latest frame
    Lost,
    /// Terminal; never reported again
    Removed,
}

/// Range measured on a frame the track was matched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    pub frame: u64,
    pub distance_m: f64,
}

/// Internal track state, owned by the tracker
#[derive(Debug, Clone)]
pub(crate) struct Track {
    pub id: TrackId,
    pub status: TrackStatus,
    pub class: ObjectClass,
    pub confidence: f64,
    pub filter: KalmanBoxFilter,
    /// Total successful associations
    pub hits: u32,
    /// Consecutive successful associations
    pub hit_streak: u32,
    /// Frames since creation
    pub age: u32,
    /// Frames since the last match
    pub time_since_update: u32,
    pub distances: RingBuffer<DistanceSample>,
}

impl Track {
    pub fn spawn(id: TrackId, detection: &Detection, config: &TrackerConfig) -> Self {
        let mut track = Self {
            id,
            status: TrackStatus::Tentative,
            class: detection.class,
            confidence: detection.confidence,
            filter: KalmanBoxFilter::new(&detection.bbox, &config.noise),
            hits: 1,
            hit_streak: 1,
            age: 0,
            time_since_update: 0,
            distances: RingBuffer::new(config.distance_history_len),
        };
        if track.hits >= config.min_hits {
            track.status = TrackStatus::Confirmed;
        }
        track
    }

    pub fn predict(&mut self) -> Result<(), TrackerError> {
        self.age += 1;
        self.filter.predict()
    }

    /// Fold in an associated detection; `refresh_class` is false for
    /// low-confidence recoveries whose label is not trusted
    pub fn update(
        &mut self,
        detection: &Detection,
        refresh_class: bool,
        config: &TrackerConfig,
    ) -> Result<(), TrackerError> {
        self.filter.update(&detection.bbox)?;

        self.hits += 1;
        self.hit_streak += 1;
        self.time_since_update = 0;
        self.confidence = detection.confidence;
        if refresh_class {
            self.class = detection.class;
        }

        match self.status {
            TrackStatus::Tentative if self.hits >= config.min_hits => {
                self.status = TrackStatus::Confirmed;
            }
            TrackStatus::Lost => self.status = TrackStatus::Confirmed,
            _ => {}
        }
        Ok(())
    }

    pub fn mark_missed(&mut self, config: &TrackerConfig) {
        self.time_since_update += 1;
        self.hit_streak = 0;

        self.status = match self.status {
            TrackStatus::Tentative => TrackStatus::Removed,
            TrackStatus::Confirmed | TrackStatus::Lost
                if self.time_since_update > config.max_age =>
            {
                TrackStatus::Removed
            }
            TrackStatus::Confirmed | TrackStatus::Lost => TrackStatus::Lost,
            TrackStatus::Removed => TrackStatus::Removed,
        };
    }

    pub fn is_visible(&self, config: &TrackerConfig) -> bool {
        match self.status {
            TrackStatus::Confirmed => true,
            TrackStatus::Lost => self.time_since_update <= config.lost_visibility_frames,
            TrackStatus::Tentative | TrackStatus::Removed => false,
        }
    }

    pub fn view(&self) -> Option<TrackView> {
        Some(TrackView {
            id: self.id,
            bbox: self.filter.bbox()?,
            class: self.class,
            confidence: self.confidence,
            status: self.status,
            hits: self.hits,
            age: self.age,
            time_since_update: self.time_since_update,
            distance_history: self.distances.to_vec(),
        })
    }
}

/// Read-only view of a visible track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackView {
    pub id: TrackId,

    /// Filtered box (predicted while Lost)
    pub bbox: BoundingBox,

    pub class: ObjectClass,

    /// Confidence of the last associated detection
    pub confidence: f64,

    pub status: TrackStatus,

    pub hits: u32,

    pub age: u32,

    pub time_since_update: u32,

    /// Retained distance samples, oldest first
    pub distance_history: Vec<DistanceSample>,
}

impl TrackView {
    /// Matched to a detection on the current frame
    pub fn is_fresh(&self) -> bool {
        self.time_since_update == 0
    }
}
