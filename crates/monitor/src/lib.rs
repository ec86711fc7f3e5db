//! Drowsiness Monitor
//!
//! Wires the detection engine to a landmark source, the alarm backend,
//! logging, and layered configuration.

pub mod reporter;
pub mod session;
pub mod settings;
pub mod source;

pub use reporter::{BlinkTally, SessionSummary, StatusReporter};
pub use session::run_session;
pub use settings::{LogSettings, MonitorSettings, SinkKind, SourceSettings};
pub use source::{FrameRecord, LandmarkSource, ReplaySource};

use alerting::{AlarmController, AlarmSink, BellSink, LogSink};
use dms::{DmsError, DrowsinessEngine};
use std::sync::Arc;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Dms(#[from] DmsError),

    #[error("Landmark source I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Initialize logging
pub fn init_logging(settings: &LogSettings) -> Result<(), MonitorError> {
    let level: Level = settings
        .level
        .parse()
        .map_err(|_| MonitorError::Logging(format!("unknown log level '{}'", settings.level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(settings.target);

    let result = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| MonitorError::Logging(e.to_string()))
}

/// Build the alarm backend selected in the settings
pub fn alarm_sink(kind: SinkKind) -> Arc<dyn AlarmSink> {
    match kind {
        SinkKind::Log => Arc::new(LogSink),
        SinkKind::Bell => Arc::new(BellSink),
    }
}

/// Build an engine from settings, with the given alarm backend
pub fn build_engine(settings: &MonitorSettings, sink: Arc<dyn AlarmSink>) -> DrowsinessEngine {
    let alarm = AlarmController::new(settings.alarm.clone(), sink);
    DrowsinessEngine::new(settings.thresholds, alarm)
}
