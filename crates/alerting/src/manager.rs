//! Per-session dedup ledger keyed by alert kind and track

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use tracker::TrackId;

use crate::alert::{Alert, AlertKind, AlertSeverity};
use crate::config::CooldownConfig;

/// Deduplication key; session-scoped kinds never carry a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub kind: AlertKind,
    pub track_id: Option<TrackId>,
}

impl AlertKey {
    pub fn new(kind: AlertKind, track_id: Option<TrackId>) -> Self {
        Self {
            kind,
            track_id: track_id.filter(|_| kind.is_track_scoped()),
        }
    }

    pub fn of(alert: &Alert) -> Self {
        Self::new(alert.kind, alert.track_id)
    }
}

/// Ledger entry of one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    /// Frame of the last emission
    pub last_frame: u64,
    /// Stream time of the last emission (seconds)
    pub last_fired_s: f64,
    /// Severity of the last emission
    pub last_severity: AlertSeverity,
    pub fire_count: usize,
    pub acknowledged: bool,
}

/// Cooldown bookkeeping for one session
#[derive(Debug, Clone)]
pub struct AlertManager {
    cooldowns: CooldownConfig,
    states: HashMap<AlertKey, AlertState>,
    fired_total: usize,
}

impl AlertManager {
    pub fn new(cooldowns: CooldownConfig) -> Self {
        Self {
            cooldowns,
            states: HashMap::new(),
            fired_total: 0,
        }
    }

    /// Check whether `key` may fire at stream time `now_s`.
    ///
    /// Any emission of the key inside its cooldown suppresses it, whatever
    /// the severity.
    pub fn should_fire(&self, key: &AlertKey, now_s: f64) -> bool {
        match self.states.get(key) {
            Some(state) => {
                let cooldown = self.cooldowns.for_kind(key.kind);
                let elapsed = now_s - state.last_fired_s;
                if elapsed < cooldown {
                    debug!(
                        kind = %key.kind,
                        track = ?key.track_id,
                        elapsed_s = elapsed,
                        cooldown_s = cooldown,
                        "Alert suppressed: in cooldown period"
                    );
                    return false;
                }
                true
            }
            None => true,
        }
    }

    /// Stamp an emission of `key` into the ledger
    pub fn record_fire(&mut self, key: AlertKey, severity: AlertSeverity, frame: u64, now_s: f64) {
        self.fired_total += 1;

        let state = self.states.entry(key).or_insert(AlertState {
            last_frame: frame,
            last_fired_s: now_s,
            last_severity: severity,
            fire_count: 0,
            acknowledged: false,
        });

        state.last_frame = frame;
        state.last_fired_s = now_s;
        state.last_severity = severity;
        state.fire_count += 1;
        state.acknowledged = false;

        debug!(kind = %key.kind, track = ?key.track_id, count = state.fire_count, "Alert recorded");
    }

    /// Fire `key` if the ledger allows it, recording the emission
    pub fn try_fire(&mut self, key: AlertKey, severity: AlertSeverity, frame: u64, now_s: f64) -> bool {
        if !self.should_fire(&key, now_s) {
            return false;
        }
        self.record_fire(key, severity, frame, now_s);
        true
    }

    /// Mark the entry acknowledged until its next emission
    pub fn acknowledge(&mut self, key: &AlertKey) -> bool {
        if let Some(state) = self.states.get_mut(key) {
            state.acknowledged = true;
            info!(kind = %key.kind, track = ?key.track_id, "Alert acknowledged");
            true
        } else {
            false
        }
    }

    pub fn state(&self, key: &AlertKey) -> Option<&AlertState> {
        self.states.get(key)
    }

    /// Entries not acknowledged since their last emission, ordered by key
    pub fn get_pending(&self) -> Vec<(&AlertKey, &AlertState)> {
        let mut pending: Vec<_> = self
            .states
            .iter()
            .filter(|(_, state)| !state.acknowledged)
            .collect();
        pending.sort_by_key(|(key, _)| **key);
        pending
    }

    /// Alerts fired over the session
    pub fn fired_total(&self) -> usize {
        self.fired_total
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(CooldownConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: AlertSeverity = AlertSeverity::Warning;

    fn fcw(track: u64) -> AlertKey {
        AlertKey::new(AlertKind::ForwardCollision, Some(TrackId(track)))
    }

    #[test]
    fn test_deduplication() {
        let mut manager = AlertManager::default();

        // First alert should fire
        assert!(manager.try_fire(fcw(1), W, 0, 0.0));

        // Duplicate inside the 3 s cooldown should not fire
        assert!(!manager.try_fire(fcw(1), W, 30, 1.0));
        assert!(!manager.try_fire(fcw(1), W, 89, 89.0 / 30.0));

        // Cooldown elapsed
        assert!(manager.try_fire(fcw(1), W, 90, 3.0));
        assert_eq!(manager.state(&fcw(1)).unwrap().fire_count, 2);
        assert_eq!(manager.state(&fcw(1)).unwrap().last_frame, 90);
    }

    #[test]
    fn test_higher_severity_waits_for_cooldown() {
        let mut manager = AlertManager::default();
        assert!(manager.try_fire(fcw(1), W, 18, 0.6));
        assert!(!manager.try_fire(fcw(1), AlertSeverity::Critical, 19, 0.63));
        assert!(!manager.try_fire(fcw(1), AlertSeverity::Critical, 107, 107.0 / 30.0));
        assert_eq!(manager.state(&fcw(1)).unwrap().last_severity, W);

        assert!(manager.try_fire(fcw(1), AlertSeverity::Critical, 108, 3.6));
        assert_eq!(manager.state(&fcw(1)).unwrap().last_severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_severity_jitter_stays_within_cooldown_bound() {
        let mut manager = AlertManager::default();
        let cycle = [AlertSeverity::Info, W, AlertSeverity::Critical];
        let fired = (0..300u64)
            .filter(|&frame| {
                let severity = cycle[frame as usize % cycle.len()];
                manager.try_fire(fcw(1), severity, frame, frame as f64 / 30.0)
            })
            .count();
        assert_eq!(fired, 4);
    }

    #[test]
    fn test_tracks_are_independent() {
        let mut manager = AlertManager::default();
        assert!(manager.try_fire(fcw(1), W, 10, 0.33));
        assert!(manager.try_fire(fcw(2), W, 10, 0.33));
        assert_eq!(manager.fired_total(), 2);
    }

    #[test]
    fn test_session_scoped_key_drops_track() {
        let a = AlertKey::new(AlertKind::LaneDeparture, Some(TrackId(4)));
        let b = AlertKey::new(AlertKind::LaneDeparture, None);
        assert_eq!(a, b);

        let mut manager = AlertManager::default();
        assert!(manager.try_fire(a, W, 0, 0.0));
        assert!(!manager.try_fire(b, W, 60, 2.0));
    }

    #[test]
    fn test_sustained_condition_fires_at_most_four_times() {
        let mut manager = AlertManager::default();
        let fired = (0..300u64)
            .filter(|&frame| manager.try_fire(fcw(1), W, frame, frame as f64 / 30.0))
            .count();
        assert_eq!(fired, 4);
    }

    #[test]
    fn test_acknowledgement() {
        let mut manager = AlertManager::default();
        let drowsy = AlertKey::new(AlertKind::Drowsiness, None);
        manager.record_fire(drowsy, W, 12, 0.4);

        assert_eq!(manager.get_pending().len(), 1);
        assert!(manager.acknowledge(&drowsy));
        assert!(manager.state(&drowsy).unwrap().acknowledged);
        assert!(manager.get_pending().is_empty());
        assert!(!manager.acknowledge(&fcw(9)));

        // A new emission re-opens the alert
        manager.record_fire(drowsy, W, 400, 13.3);
        assert!(!manager.state(&drowsy).unwrap().acknowledged);
    }
}
