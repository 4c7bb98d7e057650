//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Date and time layout used in transcript headers and footers (day/month/year, 24-hour).
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Time-of-day layout used for per-message stamps.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Formats as `dd/mm/yyyy HH:MM:SS`.
    pub fn to_date_time_string(&self) -> String {
        self.0.format(DATE_TIME_FORMAT).to_string()
    }

    /// Formats as `HH:MM:SS`.
    pub fn to_clock_string(&self) -> String {
        self.0.format(CLOCK_FORMAT).to_string()
    }

    /// Millisecond-precision stamp safe to embed in file names.
    ///
    /// `2026-10-17T09:30:00.123Z` becomes `2026-10-17T09-30-00-123Z`.
    pub fn to_file_safe_string(&self) -> String {
        self.0
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-")
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> Timestamp {
        Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap() + Duration::milliseconds(42),
        )
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn date_time_string_is_day_month_year_24h() {
        assert_eq!(fixed().to_date_time_string(), "07/03/2026 14:05:09");
    }

    #[test]
    fn clock_string_has_second_precision() {
        assert_eq!(fixed().to_clock_string(), "14:05:09");
    }

    #[test]
    fn file_safe_string_has_no_colons_or_periods() {
        let s = fixed().to_file_safe_string();
        assert_eq!(s, "2026-03-07T14-05-09-042Z");
        assert!(!s.contains(':'));
        assert!(!s.contains('.'));
    }

    #[test]
    fn duration_since_is_signed() {
        let start = fixed();
        let later = start.plus_secs(90);
        assert_eq!(later.duration_since(&start).num_seconds(), 90);
        assert_eq!(start.duration_since(&later).num_seconds(), -90);
    }
}
