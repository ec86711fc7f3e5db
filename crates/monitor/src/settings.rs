//! Layered service settings (file, then environment)

use alerting::AlarmConfig;
use config::{Config, Environment, File, FileFormat};
use dms::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::MonitorError;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "drowsiness-monitor";

/// Environment prefix, e.g. `DROWSY__THRESHOLDS__EAR_THRESHOLD=0.2`
pub const ENV_PREFIX: &str = "DROWSY";

/// Complete service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub thresholds: Thresholds,
    pub alarm: AlarmConfig,
    pub alarm_sink: SinkKind,
    pub logging: LogSettings,
    pub source: SourceSettings,
}

/// Audio backend used for the alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Log,
    Bell,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Maximum level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Include the event target (module path)
    pub target: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            target: true,
        }
    }
}

/// Landmark source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// JSON-lines landmark recording
    pub path: Option<PathBuf>,
    /// Pace replay at this many milliseconds per frame (0 = as fast as possible)
    pub frame_interval_ms: u64,
}

impl SourceSettings {
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.frame_interval_ms > 0).then(|| Duration::from_millis(self.frame_interval_ms))
    }
}

impl MonitorSettings {
    /// Load settings from `path` (or the default file, if present) overlaid
    /// with `DROWSY__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    /// Parse settings from a TOML document
    pub fn from_toml(document: &str) -> Result<Self, MonitorError> {
        let config = Config::builder()
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?;

        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, MonitorError> {
        let settings: Self = config.try_deserialize()?;
        settings.thresholds.validate()?;
        Ok(settings)
    }
}
