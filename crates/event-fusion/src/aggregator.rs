//! Session registry for rolling contexts

use std::collections::HashMap;

use adas::{EnrichedTrack, LaneSummary, RiskThresholds, VehicleSummary, MAX_FPS};
use dms::DriverSummary;
use tracing::{debug, info};

use crate::config::ContextConfig;
use crate::context::ContextState;
use crate::{FusionError, SessionId};

/// Owns one [`ContextState`] per active session
#[derive(Debug)]
pub struct ContextAggregator {
    config: ContextConfig,
    thresholds: RiskThresholds,
    sessions: HashMap<SessionId, ContextState>,
}

impl ContextAggregator {
    pub fn new(config: ContextConfig, thresholds: RiskThresholds) -> Result<Self, FusionError> {
        config.validate(&thresholds)?;
        Ok(Self {
            config,
            thresholds,
            sessions: HashMap::new(),
        })
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn has_session(&self, session: &SessionId) -> bool {
        self.sessions.contains_key(session)
    }

    /// Open an empty context sized for `fps`
    pub fn start_session(&mut self, session: SessionId, fps: f64) -> Result<(), FusionError> {
        if !(fps.is_finite() && fps > 0.0 && fps <= MAX_FPS) {
            return Err(FusionError::InvalidConfig(format!(
                "fps must lie in (0, {MAX_FPS}], got {fps}"
            )));
        }
        if self.sessions.contains_key(&session) {
            return Err(FusionError::SessionExists(session));
        }
        let state = ContextState::new(fps, self.config.clone(), self.thresholds.clone());
        info!(session = %session, window = state.window_capacity(), "Context session started");
        self.sessions.insert(session, state);
        Ok(())
    }

    /// Drop a session's context, returning its final state
    pub fn end_session(&mut self, session: &SessionId) -> Result<ContextState, FusionError> {
        let state = self
            .sessions
            .remove(session)
            .ok_or_else(|| FusionError::UnknownSession(session.clone()))?;
        info!(session = %session, frames = state.frames_observed(), "Context session ended");
        Ok(state)
    }

    /// Append one frame's signals to the session windows
    pub fn update(
        &mut self,
        session: &SessionId,
        lane: &LaneSummary,
        tracks: &[EnrichedTrack],
        driver: &DriverSummary,
    ) -> Result<(), FusionError> {
        let state = self
            .sessions
            .get_mut(session)
            .ok_or_else(|| FusionError::UnknownSession(session.clone()))?;

        if !state.push_lane(lane) {
            debug!(session = %session, confidence = lane.confidence, offset = lane.offset_m, "Dropping malformed lane summary");
        }
        state.push_scene(tracks);
        if !state.push_driver(driver) {
            debug!(session = %session, alertness = driver.alertness, "Dropping malformed driver summary");
        }
        state.mark_frame();
        Ok(())
    }

    /// Record ego speed and recognised signs
    pub fn record_vehicle(
        &mut self,
        session: &SessionId,
        vehicle: &VehicleSummary,
    ) -> Result<(), FusionError> {
        let state = self
            .sessions
            .get_mut(session)
            .ok_or_else(|| FusionError::UnknownSession(session.clone()))?;
        state.record_vehicle(vehicle);
        Ok(())
    }

    /// Read-only view of a session's context
    pub fn snapshot(&self, session: &SessionId) -> Result<&ContextState, FusionError> {
        self.sessions
            .get(session)
            .ok_or_else(|| FusionError::UnknownSession(session.clone()))
    }
}
