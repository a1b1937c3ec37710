use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default timezone for deriving "today" from an instant.
pub const DEFAULT_TZ: Tz = chrono_tz::UTC;

/// Converts a UTC instant to a calendar date in the given timezone.
///
/// This is the single place where instants become business dates, so the
/// month boundary used by the edit policy follows the console's timezone.
pub fn local_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Parses an IANA timezone name, e.g. `America/Mexico_City`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}
