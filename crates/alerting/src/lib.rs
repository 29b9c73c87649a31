//! Alerting System
//!
//! Turns aggregated session context and the current frame's enriched tracks
//! into severity-ranked alerts, deduplicated per (session, kind, track) with
//! stream-time cooldowns.

mod alert;
mod config;
mod engine;
mod manager;
pub mod rules;

pub use alert::{Alert, AlertKind, AlertSeverity};
pub use config::{AlertConfig, CooldownConfig};
pub use engine::RiskEngine;
pub use manager::{AlertKey, AlertManager, AlertState};

use event_fusion::SessionId;
use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Session already active: {0}")]
    SessionExists(SessionId),

    #[error("Invalid alert configuration: {0}")]
    InvalidConfig(String),
}
