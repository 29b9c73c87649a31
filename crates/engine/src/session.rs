//! Session registry and the per-frame pipeline

use std::collections::HashMap;

use adas::{Calibration, RangeEstimator};
use alerting::{AlertKind, RiskEngine};
use event_fusion::{ContextAggregator, ContextState, SessionId};
use metrics::{counter, gauge};
use tracing::{debug, info, info_span};
use tracker::{TrackId, Tracker};

use crate::config::EngineConfig;
use crate::frame::{ContextScores, FrameInput, FrameOutput, SessionReport};
use crate::EngineError;

/// State owned by one session besides its context and ledger
#[derive(Debug)]
struct Session {
    tracker: Tracker,
    estimator: RangeEstimator,
    /// Index the next frame must carry
    next_frame: Option<u64>,
    frames_processed: u64,
}

/// Temporal fusion & risk pipeline over many independent sessions
#[derive(Debug)]
pub struct SafetyEngine {
    config: EngineConfig,
    sessions: HashMap<SessionId, Session>,
    context: ContextAggregator,
    risk: RiskEngine,
}

impl SafetyEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let context = ContextAggregator::new(config.context.clone(), config.thresholds().clone())?;
        let risk = RiskEngine::new(config.alerts.clone(), config.thresholds().clone())?;
        Ok(Self {
            config,
            sessions: HashMap::new(),
            context,
            risk,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Open a session with fresh tracks, context and dedup ledger
    pub fn start_session(&mut self, id: SessionId, calibration: Calibration) -> Result<(), EngineError> {
        if self.sessions.contains_key(&id) {
            return Err(EngineError::SessionExists(id));
        }
        calibration
            .validate()
            .map_err(|e| EngineError::InvalidCalibration(e.to_string()))?;

        let tracker = Tracker::new(self.config.tracker.clone())?;
        let estimator = RangeEstimator::new(self.config.range.clone(), calibration.clone())?;
        self.context.start_session(id.clone(), calibration.fps)?;
        if let Err(e) = self.risk.start_session(id.clone(), &calibration) {
            self.context.end_session(&id)?;
            return Err(e.into());
        }

        info!(
            session = %id,
            fps = calibration.fps,
            focal_length_px = calibration.focal_length_px,
            "Session started"
        );
        self.sessions.insert(
            id,
            Session {
                tracker,
                estimator,
                next_frame: None,
                frames_processed: 0,
            },
        );
        gauge!("safety_sessions_active").set(self.sessions.len() as f64);
        Ok(())
    }

    /// Discard all state owned by the session
    pub fn end_session(&mut self, id: &SessionId) -> Result<SessionReport, EngineError> {
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| EngineError::UnknownSession(id.clone()))?;
        self.context.end_session(id)?;
        let alerts_unacknowledged = self.risk.ledger(id)?.get_pending().len();
        let alerts_emitted = self.risk.end_session(id)?;

        gauge!("safety_sessions_active").set(self.sessions.len() as f64);
        info!(
            session = %id,
            frames = session.frames_processed,
            alerts = alerts_emitted,
            unacknowledged = alerts_unacknowledged,
            "Session ended"
        );
        Ok(SessionReport {
            session: id.clone(),
            frames_processed: session.frames_processed,
            alerts_emitted,
            alerts_unacknowledged,
        })
    }

    /// Run one frame through tracker, range estimator, context and risk engine
    pub fn process_frame(&mut self, id: &SessionId, input: &FrameInput) -> Result<FrameOutput, EngineError> {
        let span = info_span!("frame", session = %id, frame = input.frame);
        let _enter = span.enter();

        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownSession(id.clone()))?;

        if let Some(expected) = session.next_frame {
            if input.frame < expected {
                return Err(EngineError::FrameOutOfOrder {
                    session: id.clone(),
                    last: expected - 1,
                    got: input.frame,
                });
            }
            if input.frame > expected {
                return Err(EngineError::FrameGap {
                    session: id.clone(),
                    expected,
                    got: input.frame,
                });
            }
        }
        let frame = input.frame;
        let next_frame = frame
            .checked_add(1)
            .ok_or_else(|| EngineError::FrameIndexExhausted(id.clone()))?;

        // Tracks, then range samples for the tracks matched on this frame
        let frame_height = session.estimator.calibration().frame_height;
        let views = session.tracker.update(&input.detections);
        for view in &views {
            if let Some(sample) = session.estimator.sample(view, frame_height, frame) {
                session.tracker.record_distance(view.id, sample);
            }
        }
        let tracks: Vec<_> = session
            .tracker
            .visible_tracks()
            .iter()
            .map(|view| session.estimator.estimate(view, frame_height, frame))
            .collect();
        debug!(detections = input.detections.len(), visible = tracks.len(), "Tracks updated");

        if let Some(vehicle) = &input.vehicle {
            self.context.record_vehicle(id, vehicle)?;
        }
        self.context.update(id, &input.lane, &tracks, &input.driver)?;
        let state = self.context.snapshot(id)?;
        let alerts = self
            .risk
            .assess(id, state, &tracks, &input.lane, &input.driver, frame)?;

        session.next_frame = Some(next_frame);
        session.frames_processed += 1;

        counter!("safety_frames_processed_total").increment(1);
        for alert in &alerts {
            counter!("safety_alerts_emitted_total", "kind" => alert.kind.as_str()).increment(1);
        }

        Ok(FrameOutput {
            frame,
            tracks,
            alerts,
            context: ContextScores::from(state),
        })
    }

    /// Read-only view of a session's rolling context
    pub fn snapshot(&self, id: &SessionId) -> Result<&ContextState, EngineError> {
        Ok(self.context.snapshot(id)?)
    }

    /// Acknowledge the ledger entry of (session, kind, track)
    pub fn acknowledge(
        &mut self,
        id: &SessionId,
        kind: AlertKind,
        track_id: Option<TrackId>,
    ) -> Result<bool, EngineError> {
        Ok(self.risk.acknowledge(id, kind, track_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adas::LaneSummary;
    use tracker::{BoundingBox, Detection, ObjectClass};

    fn engine() -> SafetyEngine {
        SafetyEngine::new(EngineConfig::default()).unwrap()
    }

    fn car(frame: u64) -> Detection {
        let x = 600.0 + frame as f64 * 2.0;
        Detection::new(BoundingBox::new(x, 300.0, x + 120.0, 400.0), ObjectClass::Car, 0.9)
    }

    #[test]
    fn test_session_lifecycle() {
        let mut engine = engine();
        let id = SessionId::from("video-1");
        engine.start_session(id.clone(), Calibration::default()).unwrap();
        assert!(matches!(
            engine.start_session(id.clone(), Calibration::default()),
            Err(EngineError::SessionExists(_))
        ));

        for frame in 0..5 {
            engine
                .process_frame(&id, &FrameInput::new(frame, vec![car(frame)]))
                .unwrap();
        }
        let report = engine.end_session(&id).unwrap();
        assert_eq!(report.frames_processed, 5);
        assert_eq!(engine.session_count(), 0);
        assert!(matches!(engine.snapshot(&id), Err(EngineError::UnknownSession(_))));
    }

    #[test]
    fn test_invalid_calibration() {
        let mut engine = engine();
        let calibration = Calibration {
            fps: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            engine.start_session(SessionId::from("x"), calibration),
            Err(EngineError::InvalidCalibration(_))
        ));
        let absurd = Calibration {
            fps: 1e12,
            ..Default::default()
        };
        assert!(matches!(
            engine.start_session(SessionId::from("x"), absurd),
            Err(EngineError::InvalidCalibration(_))
        ));
        assert_eq!(engine.session_count(), 0);
        // Nothing half-registered
        engine
            .start_session(SessionId::from("x"), Calibration::default())
            .unwrap();
    }

    #[test]
    fn test_frame_order_is_enforced() {
        let mut engine = engine();
        let id = SessionId::from("ordered");
        engine.start_session(id.clone(), Calibration::default()).unwrap();

        engine.process_frame(&id, &FrameInput::new(10, vec![])).unwrap();
        engine.process_frame(&id, &FrameInput::new(11, vec![])).unwrap();

        assert!(matches!(
            engine.process_frame(&id, &FrameInput::new(11, vec![])),
            Err(EngineError::FrameOutOfOrder { last: 11, got: 11, .. })
        ));
        assert!(matches!(
            engine.process_frame(&id, &FrameInput::new(14, vec![])),
            Err(EngineError::FrameGap { expected: 12, got: 14, .. })
        ));
        // Rejected frames left no trace
        assert_eq!(engine.snapshot(&id).unwrap().frames_observed(), 2);
        engine.process_frame(&id, &FrameInput::new(12, vec![])).unwrap();
    }

    #[test]
    fn test_last_frame_index_is_rejected() {
        let mut engine = engine();
        let id = SessionId::from("overflow");
        engine.start_session(id.clone(), Calibration::default()).unwrap();

        assert!(matches!(
            engine.process_frame(&id, &FrameInput::new(u64::MAX, vec![car(0)])),
            Err(EngineError::FrameIndexExhausted(_))
        ));
        assert_eq!(engine.snapshot(&id).unwrap().frames_observed(), 0);
        engine.process_frame(&id, &FrameInput::new(u64::MAX - 1, vec![])).unwrap();
    }

    #[test]
    fn test_report_counts_unacknowledged_alerts() {
        let mut engine = engine();
        let id = SessionId::from("report");
        engine.start_session(id.clone(), Calibration::default()).unwrap();

        // Speeding from the first frame, no traffic
        let speeding = |frame| FrameInput {
            vehicle: Some(adas::VehicleSummary {
                speed_kmh: Some(90.0),
                signs: vec![adas::TrafficSign::SpeedLimit(50)],
            }),
            ..FrameInput::new(frame, vec![])
        };
        engine.process_frame(&id, &speeding(0)).unwrap();
        engine.process_frame(&id, &speeding(1)).unwrap();

        let report = engine.end_session(&id).unwrap();
        assert_eq!(report.alerts_emitted, 1);
        assert_eq!(report.alerts_unacknowledged, 1);

        engine.start_session(id.clone(), Calibration::default()).unwrap();
        engine.process_frame(&id, &speeding(0)).unwrap();
        assert!(engine.acknowledge(&id, AlertKind::SpeedViolation, None).unwrap());
        let report = engine.end_session(&id).unwrap();
        assert_eq!(report.alerts_unacknowledged, 0);
    }

    #[test]
    fn test_unknown_session() {
        let mut engine = engine();
        let result = engine.process_frame(&SessionId::from("ghost"), &FrameInput::new(0, vec![]));
        assert!(matches!(result, Err(EngineError::UnknownSession(_))));
    }

    #[test]
    fn test_confirmed_track_is_ranged() {
        let mut engine = engine();
        let id = SessionId::from("ranged");
        engine.start_session(id.clone(), Calibration::default()).unwrap();

        let mut last = None;
        for frame in 0..6 {
            let input = FrameInput {
                lane: LaneSummary {
                    confidence: 0.9,
                    ..Default::default()
                },
                ..FrameInput::new(frame, vec![car(frame)])
            };
            last = Some(engine.process_frame(&id, &input).unwrap());
        }
        let output = last.unwrap();
        assert_eq!(output.tracks.len(), 1);
        let track = &output.tracks[0];
        // 1.5 m car, 100 px tall, focal 700 px
        assert!((track.distance_m.unwrap() - 10.5).abs() < 0.5);
        assert!(track.velocity_mps.is_some());
    }
}
