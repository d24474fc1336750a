//! Background job configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Run the background jobs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Local hour of the daily review transition
    #[serde(default = "default_review_run_hour")]
    pub review_run_hour: u32,

    /// Local minute of the daily review transition
    #[serde(default)]
    pub review_run_minute: u32,

    /// Publicity deadline poll interval in seconds
    #[serde(default = "default_publicity_interval")]
    pub publicity_interval_secs: u64,
}

impl SchedulerConfig {
    pub fn publicity_interval(&self) -> Duration {
        Duration::from_secs(self.publicity_interval_secs)
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.review_run_hour > 23 || self.review_run_minute > 59 {
            return Err(ValidationError::InvalidScheduleTime {
                hour: self.review_run_hour,
                minute: self.review_run_minute,
            });
        }
        if self.publicity_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            review_run_hour: default_review_run_hour(),
            review_run_minute: 0,
            publicity_interval_secs: default_publicity_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_review_run_hour() -> u32 {
    1
}

fn default_publicity_interval() -> u64 {
    30
}
