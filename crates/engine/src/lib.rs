//! Temporal Fusion & Risk Engine
//!
//! Runs the per-frame pipeline for every active session:
//! detections → tracks → enriched tracks → rolling context → alerts.
//!
//! Sessions are independent; within one session frames must arrive in
//! strictly increasing, gap-free order.

pub mod config;
mod frame;
mod logging;
mod session;

pub use config::EngineConfig;
pub use frame::{ContextScores, FrameInput, FrameOutput, SessionReport};
pub use logging::init_logging;
pub use session::SafetyEngine;

pub use adas::Calibration;
pub use alerting::{Alert, AlertKind, AlertSeverity};
pub use event_fusion::SessionId;

use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Session already active: {0}")]
    SessionExists(SessionId),

    #[error("Session {session}: frame {got} is not after frame {last}")]
    FrameOutOfOrder { session: SessionId, last: u64, got: u64 },

    #[error("Session {session}: expected frame {expected}, got {got}")]
    FrameGap { session: SessionId, expected: u64, got: u64 },

    #[error("Session {0}: frame index space exhausted")]
    FrameIndexExhausted(SessionId),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Tracker error: {0}")]
    Tracker(#[from] tracker::TrackerError),

    #[error("Range estimator error: {0}")]
    Adas(#[from] adas::AdasError),

    #[error("Context error: {0}")]
    Fusion(#[from] event_fusion::FusionError),

    #[error("Alerting error: {0}")]
    Alert(#[from] alerting::AlertError),
}
