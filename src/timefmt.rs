//! Display Time Zone
//!
//! Timestamps arrive from the backend in UTC (or without an offset) and are
//! shown to the operator in a fixed local offset. This module owns:
//! - `DisplayZone`: the offset used for every rendered timestamp
//! - date labels used to group alerts ("Today", "Yesterday", "Jan 5, 2024")
//! - lenient timestamp parsing shared by record decoding and the CLI

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};

/// Offset used to render timestamps and compute calendar-relative labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone {
    offset: FixedOffset,
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::local()
    }
}

impl DisplayZone {
    /// Zone with the given fixed offset
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// UTC display
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// The host's current local offset
    pub fn local() -> Self {
        Self {
            offset: Local::now().offset().fix(),
        }
    }

    /// Build from an offset in minutes east of UTC
    pub fn from_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Today's calendar date in this zone
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// Calendar date of a timestamp in this zone
    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// Render a timestamp as `1/15/2024, 2:35:42 PM`
    pub fn format_datetime(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.offset)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string()
    }

    /// Render a date as `Jan 15, 2024`
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format("%b %-d, %Y").to_string()
    }

    /// Calendar-relative label relative to `today`.
    ///
    /// Missing timestamps get an empty label so they still form a group.
    pub fn date_label(&self, ts: Option<DateTime<Utc>>, today: NaiveDate) -> String {
        let Some(ts) = ts else {
            return String::new();
        };

        let date = self.local_date(ts);
        if date == today {
            "Today".to_string()
        } else if today.pred_opt() == Some(date) {
            "Yesterday".to_string()
        } else {
            self.format_date(date)
        }
    }
}

/// Parse a timestamp string in any of the formats the backend has been seen
/// to emit. Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    raw.parse::<i64>().ok().and_then(from_millis)
}

/// Epoch milliseconds to a UTC timestamp
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_format_datetime_utc() {
        let zone = DisplayZone::utc();
        assert_eq!(
            zone.format_datetime(ts(2024, 1, 15, 14, 35, 42)),
            "1/15/2024, 2:35:42 PM"
        );
        assert_eq!(
            zone.format_datetime(ts(2024, 11, 3, 0, 5, 9)),
            "11/3/2024, 12:05:09 AM"
        );
    }

    #[test]
    fn test_format_datetime_with_offset() {
        let zone = DisplayZone::from_minutes(-300).unwrap();
        // 02:00 UTC is 21:00 the previous day at UTC-5
        assert_eq!(
            zone.format_datetime(ts(2024, 1, 15, 2, 0, 0)),
            "1/14/2024, 9:00:00 PM"
        );
    }

    #[test]
    fn test_date_labels() {
        let zone = DisplayZone::utc();
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        assert_eq!(zone.date_label(Some(ts(2024, 3, 10, 8, 0, 0)), today), "Today");
        assert_eq!(
            zone.date_label(Some(ts(2024, 3, 9, 23, 59, 59)), today),
            "Yesterday"
        );
        assert_eq!(
            zone.date_label(Some(ts(2024, 3, 1, 12, 0, 0)), today),
            "Mar 1, 2024"
        );
        assert_eq!(zone.date_label(None, today), "");
    }

    #[test]
    fn test_date_label_respects_offset() {
        let zone = DisplayZone::from_minutes(120).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        // 23:00 UTC on the 9th is already the 10th at UTC+2
        assert_eq!(zone.date_label(Some(ts(2024, 3, 9, 23, 0, 0)), today), "Today");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = ts(2024, 1, 15, 14, 35, 42);
        assert_eq!(parse_timestamp("2024-01-15T14:35:42Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T16:35:42+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T14:35:42"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 14:35:42"), Some(expected));
        assert!(parse_timestamp("2024-01-15T14:35:42.123456").is_some());
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(ts(2024, 1, 15, 0, 0, 0))
        );
        assert_eq!(
            parse_timestamp(&expected.timestamp_millis().to_string()),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday-ish"), None);
    }

    #[test]
    fn test_from_minutes_out_of_range() {
        assert!(DisplayZone::from_minutes(24 * 60).is_none());
        assert!(DisplayZone::from_minutes(i32::MAX).is_none());
    }
}
