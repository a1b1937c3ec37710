//! Injected source of "now".
//!
//! Every view anchors its window and its edit policy on the current month.
//! Services take an `Arc<dyn Clock>` instead of reading system time so tests
//! can pin the date.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::time_utils::{local_date_from_utc, DEFAULT_TZ};
use crate::periods::MonthKey;

pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Timezone used to turn `now()` into a calendar date.
    fn timezone(&self) -> Tz {
        DEFAULT_TZ
    }

    fn today(&self) -> NaiveDate {
        local_date_from_utc(self.now(), self.timezone())
    }

    fn current_month(&self) -> MonthKey {
        MonthKey::from_date(self.today())
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DEFAULT_TZ)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Midday UTC on the given date, far from any day boundary.
    pub fn at_date(date: NaiveDate) -> Self {
        let instant = date
            .and_hms_opt(12, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(Default::default())));
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Another clock's instant read in a different timezone.
#[derive(Clone)]
pub struct ZonedClock {
    inner: Arc<dyn Clock>,
    tz: Tz,
}

impl ZonedClock {
    pub fn new(inner: Arc<dyn Clock>, tz: Tz) -> Self {
        Self { inner, tz }
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_current_month() {
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!(clock.current_month().to_string(), "2025_01");
    }

    #[test]
    fn test_zoned_clock_shifts_current_month() {
        // 02:00 UTC on Jul 1st is still Jun 30th in Mexico City
        let instant = Utc.with_ymd_and_hms(2025, 7, 1, 2, 0, 0).unwrap();
        let utc: Arc<dyn Clock> = Arc::new(FixedClock::new(instant));
        let zoned = ZonedClock::new(utc.clone(), chrono_tz::America::Mexico_City);

        assert_eq!(utc.current_month().to_string(), "2025_07");
        assert_eq!(zoned.now(), instant);
        assert_eq!(zoned.today(), NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
        assert_eq!(zoned.current_month().to_string(), "2025_06");
    }

    #[test]
    fn test_system_clock_is_usable_as_trait_object() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::default());
        assert!(clock.current_month().year() >= 2024);
    }
}
