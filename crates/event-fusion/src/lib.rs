//! Event Fusion Engine
//!
//! Aggregates per-frame signals of one video session into rolling windows:
//! - Lane confidence, offset and departure flags
//! - Object count, nearest distance and smallest TTC
//! - Driver alertness samples
//! - Ego speed and the posted speed limit
//!
//! Derives lane stability, traffic density and driver alertness scores and
//! the sustained-departure / critical-proximity conditions read by alerting.

mod aggregator;
mod config;
mod context;

pub use aggregator::ContextAggregator;
pub use config::ContextConfig;
pub use context::{ContextState, DriverSample, LaneSample, SceneSample};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fusion error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Session already active: {0}")]
    SessionExists(SessionId),

    #[error("Invalid context configuration: {0}")]
    InvalidConfig(String),
}

/// Identifier of one video-processing session
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
