//! Logging setup

use tracing_subscriber::EnvFilter;

use crate::EngineError;

/// Install a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(json: bool) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| EngineError::Logging(e.to_string()))
}
