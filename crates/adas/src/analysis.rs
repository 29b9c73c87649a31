//! Per-frame scene summary over ranged tracks

use serde::{Deserialize, Serialize};

use crate::range::EnrichedTrack;

/// Aggregate figures of one frame's enriched tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSummary {
    /// Visible tracks on the frame
    pub object_count: usize,

    /// Nearest ranged object (meters)
    pub min_distance_m: Option<f64>,

    /// Smallest defined time to collision (seconds)
    pub min_ttc_s: Option<f64>,
}

impl SceneSummary {
    pub fn from_tracks(tracks: &[EnrichedTrack]) -> Self {
        Self {
            object_count: tracks.len(),
            min_distance_m: min_value(tracks.iter().filter_map(|t| t.distance_m)),
            min_ttc_s: min_value(tracks.iter().filter_map(|t| t.ttc_s)),
        }
    }
}

fn min_value(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectClass;
    use crate::range::RiskTier;
    use tracker::{BoundingBox, TrackId, TrackStatus};

    fn enriched(id: u64, distance_m: Option<f64>, ttc_s: Option<f64>, risk: RiskTier) -> EnrichedTrack {
        EnrichedTrack {
            track_id: TrackId(id),
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            class: ObjectClass::Car,
            status: TrackStatus::Confirmed,
            frame: 1,
            distance_m,
            velocity_mps: None,
            acceleration_mps2: None,
            ttc_s,
            risk,
            approaching: ttc_s.is_some(),
        }
    }

    #[test]
    fn test_minimums_skip_undefined_values() {
        let summary = SceneSummary::from_tracks(&[
            enriched(1, Some(12.0), None, RiskTier::Caution),
            enriched(2, Some(25.0), Some(1.2), RiskTier::Danger),
            enriched(3, None, None, RiskTier::Safe),
        ]);

        assert_eq!(summary.object_count, 3);
        assert_eq!(summary.min_distance_m, Some(12.0));
        assert_eq!(summary.min_ttc_s, Some(1.2));
    }

    #[test]
    fn test_empty_frame() {
        let summary = SceneSummary::from_tracks(&[]);
        assert_eq!(summary, SceneSummary::default());
    }
}
