//! Per-frame risk assessment over all active sessions

use std::collections::HashMap;

use adas::{Calibration, EnrichedTrack, LaneSummary, RiskThresholds};
use dms::DriverSummary;
use event_fusion::{ContextState, SessionId};
use tracing::{debug, info};

use crate::alert::{Alert, AlertKind};
use crate::config::AlertConfig;
use crate::manager::{AlertKey, AlertManager};
use crate::rules;
use crate::AlertError;

#[derive(Debug)]
struct SessionLedger {
    fps: f64,
    frame_width: f64,
    manager: AlertManager,
}

/// Converts context and enriched tracks into deduplicated alerts
#[derive(Debug)]
pub struct RiskEngine {
    config: AlertConfig,
    thresholds: RiskThresholds,
    sessions: HashMap<SessionId, SessionLedger>,
}

impl RiskEngine {
    pub fn new(config: AlertConfig, thresholds: RiskThresholds) -> Result<Self, AlertError> {
        config.validate()?;
        thresholds
            .validate()
            .map_err(|e| AlertError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            config,
            thresholds,
            sessions: HashMap::new(),
        })
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Open an empty dedup ledger for the session
    pub fn start_session(&mut self, session: SessionId, calibration: &Calibration) -> Result<(), AlertError> {
        if self.sessions.contains_key(&session) {
            return Err(AlertError::SessionExists(session));
        }
        debug!(session = %session, "Alert ledger opened");
        self.sessions.insert(
            session,
            SessionLedger {
                fps: calibration.fps,
                frame_width: calibration.frame_width,
                manager: AlertManager::new(self.config.cooldowns.clone()),
            },
        );
        Ok(())
    }

    /// Discard the session ledger, returning how many alerts it emitted
    pub fn end_session(&mut self, session: &SessionId) -> Result<usize, AlertError> {
        let ledger = self
            .sessions
            .remove(session)
            .ok_or_else(|| AlertError::UnknownSession(session.clone()))?;
        Ok(ledger.manager.fired_total())
    }

    /// Evaluate every rule for one frame and emit what the ledger allows
    pub fn assess(
        &mut self,
        session: &SessionId,
        context: &ContextState,
        tracks: &[EnrichedTrack],
        lane: &LaneSummary,
        driver: &DriverSummary,
        frame: u64,
    ) -> Result<Vec<Alert>, AlertError> {
        let ledger = self
            .sessions
            .get_mut(session)
            .ok_or_else(|| AlertError::UnknownSession(session.clone()))?;

        let mut candidates = Vec::new();
        for track in tracks {
            candidates.extend(rules::forward_collision(track, &self.thresholds));
            candidates.extend(rules::pedestrian_proximity(track, &self.config));
            candidates.extend(rules::headway(
                track,
                context.ego_speed_kmh(),
                ledger.frame_width,
                &self.config,
            ));
        }
        candidates.extend(rules::lane_departure(context, lane));
        let proxy = driver.is_well_formed().then_some(driver.alertness);
        candidates.extend(rules::drowsiness(context, proxy));
        candidates.extend(rules::speed_violation(context, &self.config));

        let now_s = frame as f64 / ledger.fps;
        let mut alerts: Vec<Alert> = candidates
            .into_iter()
            .filter(|alert| {
                ledger
                    .manager
                    .try_fire(AlertKey::of(alert), alert.severity, frame, now_s)
            })
            .map(|alert| alert.stamped(frame, now_s))
            .collect();

        alerts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(b.risk_score.total_cmp(&a.risk_score))
                .then(a.kind.cmp(&b.kind))
                .then(a.track_id.cmp(&b.track_id))
        });

        for alert in &alerts {
            info!(
                session = %session,
                frame,
                kind = %alert.kind,
                severity = ?alert.severity,
                track = ?alert.track_id,
                risk = alert.risk_score,
                "Alert emitted"
            );
        }
        Ok(alerts)
    }

    /// Mark the ledger entry of (session, kind, track) acknowledged
    pub fn acknowledge(
        &mut self,
        session: &SessionId,
        kind: AlertKind,
        track_id: Option<tracker::TrackId>,
    ) -> Result<bool, AlertError> {
        let ledger = self
            .sessions
            .get_mut(session)
            .ok_or_else(|| AlertError::UnknownSession(session.clone()))?;
        Ok(ledger.manager.acknowledge(&AlertKey::new(kind, track_id)))
    }

    /// Read-only view of a session's ledger
    pub fn ledger(&self, session: &SessionId) -> Result<&AlertManager, AlertError> {
        self.sessions
            .get(session)
            .map(|ledger| &ledger.manager)
            .ok_or_else(|| AlertError::UnknownSession(session.clone()))
    }
}
