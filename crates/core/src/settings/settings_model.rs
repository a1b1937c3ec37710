//! Engine configuration.

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_SAVE_ATTEMPTS, DEFAULT_MONTHS_AFTER, DEFAULT_MONTHS_BEFORE, DEFAULT_PERIOD_SIZE,
    DEFAULT_RETRY_BACKOFF_MS, DEFAULT_SAVE_TIMEOUT_MS,
};
use crate::editing::SavePolicy;
use crate::errors::{Error, Result};
use crate::periods::PeriodWindow;
use crate::utils::time_utils::{parse_timezone, DEFAULT_TZ};

/// Settings shared by every grid view. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridSettings {
    pub months_before: i32,
    pub months_after: i32,
    pub period_size: usize,
    pub save_timeout_ms: u64,
    pub max_save_attempts: u32,
    pub retry_backoff_ms: u64,
    /// IANA name of the timezone that decides the current month.
    pub timezone: Option<String>,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            months_before: DEFAULT_MONTHS_BEFORE,
            months_after: DEFAULT_MONTHS_AFTER,
            period_size: DEFAULT_PERIOD_SIZE,
            save_timeout_ms: DEFAULT_SAVE_TIMEOUT_MS,
            max_save_attempts: DEFAULT_MAX_SAVE_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            timezone: None,
        }
    }
}

impl GridSettings {
    /// Parses and validates settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: GridSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_size == 0 {
            return Err(Error::InvalidConfigValue(
                "periodSize must be at least 1".to_string(),
            ));
        }
        if self.save_timeout_ms == 0 {
            return Err(Error::InvalidConfigValue(
                "saveTimeoutMs must be at least 1".to_string(),
            ));
        }
        if self.max_save_attempts == 0 {
            return Err(Error::InvalidConfigValue(
                "maxSaveAttempts must be at least 1".to_string(),
            ));
        }
        if let Some(name) = &self.timezone {
            if parse_timezone(name).is_none() {
                return Err(Error::InvalidConfigValue(format!(
                    "Unknown timezone '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn window(&self) -> PeriodWindow {
        PeriodWindow {
            months_before: self.months_before,
            months_after: self.months_after,
            period_size: self.period_size,
        }
    }

    pub fn save_policy(&self) -> SavePolicy {
        SavePolicy {
            timeout: Duration::from_millis(self.save_timeout_ms),
            max_attempts: self.max_save_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn tz(&self) -> Tz {
        self.timezone
            .as_deref()
            .and_then(parse_timezone)
            .unwrap_or(DEFAULT_TZ)
    }
}
