//! Two-tier multi-object tracker

use tracing::{debug, warn};

use crate::assignment::associate;
use crate::bbox::BoundingBox;
use crate::config::TrackerConfig;
use crate::detection::Detection;
use crate::track::{DistanceSample, Track, TrackId, TrackStatus, TrackView};
use crate::TrackerError;

/// Multi-object tracker for one session.
///
/// `update` must be called once per frame, in frame order; a frame without
/// detections still needs an empty call so missed-frame accounting holds.
#[derive(Debug)]
pub struct Tracker {
    config: TrackerConfig,
    tracks: Vec<Track>,
    next_id: u64,
}

impl Tracker {
    /// Create a tracker after validating its configuration
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            config,
            tracks: Vec::new(),
            next_id: 1,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Live tracks of any status, Tentative included
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Process one frame of detections and return the visible tracks
    pub fn update(&mut self, detections: &[Detection]) -> Vec<TrackView> {
        // Split into confidence tiers, dropping malformed input
        let mut high = Vec::new();
        let mut low = Vec::new();
        for det in detections {
            if !det.is_well_formed() {
                debug!(bbox = ?det.bbox, confidence = det.confidence, "Dropping malformed detection");
                continue;
            }
            if det.confidence >= self.config.high_confidence {
                high.push(det);
            } else if det.confidence >= self.config.low_confidence_floor {
                low.push(det);
            }
        }

        // 1. Predict
        for track in &mut self.tracks {
            if let Err(e) = track.predict() {
                warn!(track = %track.id, error = %e, "Removing track after failed prediction");
                track.status = TrackStatus::Removed;
            }
        }
        self.tracks.retain(|t| t.status != TrackStatus::Removed);

        let predicted: Vec<Option<BoundingBox>> =
            self.tracks.iter().map(|t| t.filter.bbox()).collect();
        let candidates: Vec<usize> = (0..self.tracks.len())
            .filter(|&i| predicted[i].is_some())
            .collect();

        // 2-3. Associate high-confidence detections with every track
        let mut matched = vec![false; self.tracks.len()];
        let high_boxes: Vec<BoundingBox> = high.iter().map(|d| d.bbox).collect();
        let rows: Vec<BoundingBox> = candidates.iter().filter_map(|&i| predicted[i]).collect();
        let first = associate(&rows, &high_boxes, self.config.match_iou_threshold);

        for &(row, col) in &first.matches {
            let idx = candidates[row];
            matched[idx] = true;
            self.apply_update(idx, high[col], true);
        }

        // 4. Recover still-unmatched tracks with low-confidence detections
        let remaining: Vec<usize> = first.unmatched_rows.iter().map(|&r| candidates[r]).collect();
        if !remaining.is_empty() && !low.is_empty() {
            let rows: Vec<BoundingBox> = remaining.iter().filter_map(|&i| predicted[i]).collect();
            let low_boxes: Vec<BoundingBox> = low.iter().map(|d| d.bbox).collect();
            let second = associate(&rows, &low_boxes, self.config.recovery_iou_threshold);

            for &(row, col) in &second.matches {
                let idx = remaining[row];
                matched[idx] = true;
                debug!(track = %self.tracks[idx].id, "Recovered track from low-confidence detection");
                self.apply_update(idx, low[col], false);
            }
        }

        // 5. Age unmatched tracks
        for (idx, track) in self.tracks.iter_mut().enumerate() {
            if matched[idx] || track.status == TrackStatus::Removed {
                continue;
            }
            let before = track.status;
            track.mark_missed(&self.config);
            if before != track.status {
                debug!(track = %track.id, from = ?before, to = ?track.status, "Track status change");
            }
        }
        self.tracks.retain(|t| t.status != TrackStatus::Removed);

        // 6. Spawn from unmatched high-confidence detections
        for &col in &first.unmatched_cols {
            let id = TrackId(self.next_id);
            self.next_id += 1;
            debug!(track = %id, class = %high[col].class, "Spawning tentative track");
            self.tracks.push(Track::spawn(id, high[col], &self.config));
        }

        self.visible_tracks()
    }

    /// Confirmed tracks plus recently Lost ones, ordered by id
    pub fn visible_tracks(&self) -> Vec<TrackView> {
        let mut views: Vec<TrackView> = self
            .tracks
            .iter()
            .filter(|t| t.is_visible(&self.config))
            .filter_map(Track::view)
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    /// Append a range sample to a track's distance history
    pub fn record_distance(&mut self, id: TrackId, sample: DistanceSample) -> bool {
        match self.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) if sample.distance_m.is_finite() => {
                track.distances.push(sample);
                true
            }
            _ => false,
        }
    }

    fn apply_update(&mut self, idx: usize, detection: &Detection, refresh_class: bool) {
        let track = &mut self.tracks[idx];
        let before = track.status;
        match track.update(detection, refresh_class, &self.config) {
            Ok(()) => {
                if before != track.status {
                    debug!(track = %track.id, from = ?before, to = ?track.status, "Track status change");
                }
            }
            Err(e) => {
                warn!(track = %track.id, error = %e, "Removing numerically degenerate track");
                track.status = TrackStatus::Removed;
            }
        }
    }
}
