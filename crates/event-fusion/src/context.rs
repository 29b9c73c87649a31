//! Per-session rolling context and derived scores

use adas::{EnrichedTrack, LaneSummary, RiskThresholds, SceneSummary, VehicleSummary};
use dms::{alertness_penalty, DriverAssessment, DriverSummary};
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};

use crate::config::ContextConfig;

/// Lane observation retained in the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSample {
    pub confidence: f64,
    pub offset_m: f64,
    pub departing: bool,
    pub signal_active: bool,
}

/// Object-scene observation retained in the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSample {
    pub object_count: usize,
    pub min_distance_m: Option<f64>,
    pub min_ttc_s: Option<f64>,
}

/// Driver observation retained in the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverSample {
    /// Penalty in [0, 1]
    pub penalty: f64,
}

/// Rolling context of one session
#[derive(Debug, Clone, Serialize)]
pub struct ContextState {
    fps: f64,
    lane: RingBuffer<LaneSample>,
    scene: RingBuffer<SceneSample>,
    driver: RingBuffer<DriverSample>,
    /// Last posted speed limit (km/h)
    posted_speed_limit_kmh: Option<u32>,
    /// Last valid ego speed (km/h)
    ego_speed_kmh: Option<f64>,
    frames_observed: u64,
    #[serde(skip)]
    config: ContextConfig,
    #[serde(skip)]
    thresholds: RiskThresholds,
}

impl ContextState {
    pub fn new(fps: f64, config: ContextConfig, thresholds: RiskThresholds) -> Self {
        let capacity = config.window_capacity(fps);
        Self {
            fps,
            lane: RingBuffer::new(capacity),
            scene: RingBuffer::new(capacity),
            driver: RingBuffer::new(capacity),
            posted_speed_limit_kmh: None,
            ego_speed_kmh: None,
            frames_observed: 0,
            config,
            thresholds,
        }
    }

    /// Window capacity in samples
    pub fn window_capacity(&self) -> usize {
        self.lane.capacity()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frames_observed(&self) -> u64 {
        self.frames_observed
    }

    /// Push one lane sample; returns false if the sample was malformed and dropped
    pub fn push_lane(&mut self, lane: &LaneSummary) -> bool {
        if !lane.is_well_formed() {
            return false;
        }
        self.lane.push(LaneSample {
            confidence: lane.confidence,
            offset_m: lane.offset_m,
            departing: lane.departing,
            signal_active: lane.signal_active,
        });
        true
    }

    /// Push the scene summary of this frame's enriched tracks
    pub fn push_scene(&mut self, tracks: &[EnrichedTrack]) {
        let summary = SceneSummary::from_tracks(tracks);
        self.scene.push(SceneSample {
            object_count: summary.object_count,
            min_distance_m: summary.min_distance_m,
            min_ttc_s: summary.min_ttc_s,
        });
    }

    /// Push one driver sample; returns false if the sample was malformed and dropped
    pub fn push_driver(&mut self, driver: &DriverSummary) -> bool {
        if !driver.is_well_formed() {
            return false;
        }
        self.driver.push(DriverSample {
            penalty: alertness_penalty(driver, &self.config.driver),
        });
        true
    }

    /// Track ego speed and the posted limit; an end-of-restriction sign clears it
    pub fn record_vehicle(&mut self, vehicle: &VehicleSummary) {
        if let Some(speed) = vehicle.valid_speed_kmh() {
            self.ego_speed_kmh = Some(speed);
        }
        if vehicle.clears_limit() {
            self.posted_speed_limit_kmh = None;
        }
        if let Some(limit) = vehicle.speed_limit_kmh() {
            self.posted_speed_limit_kmh = Some(limit);
        }
    }

    pub(crate) fn mark_frame(&mut self) {
        self.frames_observed += 1;
    }

    pub fn posted_speed_limit_kmh(&self) -> Option<u32> {
        self.posted_speed_limit_kmh
    }

    pub fn ego_speed_kmh(&self) -> Option<f64> {
        self.ego_speed_kmh
    }

    /// Most recent lane sample
    pub fn latest_lane(&self) -> Option<&LaneSample> {
        self.lane.latest()
    }

    /// Lane stability in [0, 1]: confident, steady offsets score high
    pub fn lane_stability(&self) -> f64 {
        let n = self.lane.len();
        if n == 0 {
            return 1.0;
        }
        let mean_confidence = self.lane.iter().map(|s| s.confidence).sum::<f64>() / n as f64;
        let mean_offset = self.lane.iter().map(|s| s.offset_m).sum::<f64>() / n as f64;
        let variance = self
            .lane
            .iter()
            .map(|s| (s.offset_m - mean_offset).powi(2))
            .sum::<f64>()
            / n as f64;
        let steadiness = 1.0 - (variance / self.config.lane_offset_variance_scale).min(1.0);

        let w = self.config.lane_confidence_weight;
        (w * mean_confidence + (1.0 - w) * steadiness).clamp(0.0, 1.0)
    }

    /// Traffic density in [0, 1] from the mean object count
    pub fn traffic_density(&self) -> f64 {
        let n = self.scene.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.scene.iter().map(|s| s.object_count as f64).sum::<f64>() / n as f64;
        (mean.min(self.config.max_object_count) / self.config.max_object_count).clamp(0.0, 1.0)
    }

    /// Driver alertness in [0, 1]: one minus the mean penalty
    pub fn driver_alertness(&self) -> f64 {
        let n = self.driver.len();
        if n == 0 {
            return 1.0;
        }
        let mean_penalty = self.driver.iter().map(|s| s.penalty).sum::<f64>() / n as f64;
        (1.0 - mean_penalty).clamp(0.0, 1.0)
    }

    pub fn driver_assessment(&self) -> DriverAssessment {
        DriverAssessment::from_score(self.driver_alertness(), &self.config.driver)
    }

    /// Driver samples in the window
    pub fn driver_samples(&self) -> usize {
        self.driver.len()
    }

    /// Share of departing lane samples in the window
    pub fn departure_ratio(&self) -> f64 {
        let n = self.lane.len();
        if n == 0 {
            return 0.0;
        }
        self.lane.iter().filter(|s| s.departing).count() as f64 / n as f64
    }

    /// Samples a sustained condition needs before it may hold
    pub fn min_sustained_samples(&self) -> usize {
        self.config.min_sustained_samples(self.fps)
    }

    /// Departing in at least the configured share of a long-enough window
    pub fn sustained_lane_departure(&self) -> bool {
        self.lane.len() >= self.min_sustained_samples()
            && self.departure_ratio() >= self.config.departure_majority
    }

    /// Any sample in the window crossed the danger distance or TTC threshold
    pub fn critical_proximity(&self) -> bool {
        self.scene
            .iter()
            .any(|s| self.thresholds.is_dangerous(s.min_distance_m, s.min_ttc_s))
    }

    /// Smallest distance seen in the window
    pub fn window_min_distance_m(&self) -> Option<f64> {
        self.scene
            .iter()
            .filter_map(|s| s.min_distance_m)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
    }

    /// Smallest TTC seen in the window
    pub fn window_min_ttc_s(&self) -> Option<f64> {
        self.scene
            .iter()
            .filter_map(|s| s.min_ttc_s)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))
    }
}
