//! Daemon configuration.
//!
//! One JSON file wires the whole daemon: channel routing, alert
//! thresholds, the filter convention, and the schedule. Field errors are
//! reported individually so a bad timezone never masks a bad channel id.

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use watch_alerts::Thresholds;
use watch_classify::{ChannelId, FilterConfig};
use watch_pipeline::PipelineConfig;
use watch_scheduler::{Schedule, ScheduleError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file '{path}': {reason}")]
    Io {
        /// The offending path.
        path: String,
        /// The underlying error.
        reason: String,
    },

    /// The config file is not valid JSON.
    #[error("invalid config JSON: {0}")]
    Parse(String),

    /// A field failed validation.
    #[error("invalid config field '{field}': {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<ScheduleError> for ConfigError {
    fn from(err: ScheduleError) -> Self {
        let field = match err {
            ScheduleError::InvalidTime { .. } => "daily_at",
            ScheduleError::InvalidTimezone { .. } => "timezone",
            ScheduleError::ZeroPingInterval => "ping_every_secs",
        };
        Self::Invalid {
            field,
            reason: err.to_string(),
        }
    }
}

/// Main daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Channel whose messages are classified.
    pub watch_channel: String,
    /// Channel receiving the daily summary.
    pub summary_channel: String,
    /// Channel receiving alerts and liveness pings.
    pub alert_channel: String,
    /// Operator user id mentioned in alerts.
    pub operator: String,
    /// Alert latch thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Require the heading-marker prefix on restart requests.
    #[serde(default)]
    pub require_heading: bool,
    /// IANA timezone the daily window and tick are interpreted in.
    pub timezone: String,
    /// Local time of day for the daily check, `HH:MM`.
    pub daily_at: String,
    /// Seconds between liveness pings.
    #[serde(default = "default_ping_secs")]
    pub ping_every_secs: u64,
}

const fn default_ping_secs() -> u64 {
    300
}

impl WatchConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the JSON is invalid or a field fails
    /// validation.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("watch_channel", &self.watch_channel),
            ("summary_channel", &self.summary_channel),
            ("alert_channel", &self.alert_channel),
            ("operator", &self.operator),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "cannot be empty".to_string(),
                });
            }
        }
        self.schedule()?;
        Ok(())
    }

    /// Builds the schedule from the time fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the offending field.
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        Ok(Schedule::parse(
            &self.daily_at,
            &self.timezone,
            self.ping_every_secs,
        )?)
    }

    /// Returns the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the timezone name is unknown.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse().map_err(|_| ConfigError::Invalid {
            field: "timezone",
            reason: format!("unknown timezone '{}'", self.timezone),
        })
    }

    /// Builds the pipeline configuration.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            watch_channel: ChannelId::new(&*self.watch_channel),
            summary_channel: ChannelId::new(&*self.summary_channel),
            alert_channel: ChannelId::new(&*self.alert_channel),
            operator: self.operator.clone(),
            thresholds: self.thresholds,
            filter: FilterConfig {
                require_heading: self.require_heading,
            },
        }
    }

    /// A sample configuration for `init-config`.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            watch_channel: "C07UM0ETK5L".to_string(),
            summary_channel: "C088AHY4UAE".to_string(),
            alert_channel: "C08DFU192MT".to_string(),
            operator: "U08ECFZBYNL".to_string(),
            thresholds: Thresholds::default(),
            require_heading: true,
            timezone: "Africa/Bissau".to_string(),
            daily_at: "23:25".to_string(),
            ping_every_secs: 300,
        }
    }
}
