//! Domain primitives: Participant, DateWindow, week alignment.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of one round window.
pub const ROUND_LENGTH_DAYS: i64 = 7;

/// Opaque participant identifier (the player name on the roster).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(pub String);

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Participant(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Participant {
    fn from(name: &str) -> Self {
        Participant(name.to_string())
    }
}

/// A participant resolved against the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: i64,
    pub name: Participant,
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateWindow { start, end }
    }

    /// A round window of `ROUND_LENGTH_DAYS` beginning at `start`.
    ///
    /// `None` if the end falls outside the representable range.
    pub fn week_starting(start: DateTime<Utc>) -> Option<Self> {
        let end = start.checked_add_signed(Duration::days(ROUND_LENGTH_DAYS))?;
        Some(DateWindow { start, end })
    }

    /// The window of equal length that begins where this one ends.
    pub fn next(&self) -> Option<Self> {
        let end = self.end.checked_add_signed(self.end - self.start)?;
        Some(DateWindow {
            start: self.end,
            end,
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// True once the window has fully elapsed (end strictly before `now`).
    pub fn is_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.end < now
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Rebuild a window from stored epoch milliseconds.
    pub fn from_millis(start_ms: i64, end_ms: i64) -> Option<Self> {
        Some(DateWindow {
            start: DateTime::from_timestamp_millis(start_ms)?,
            end: DateTime::from_timestamp_millis(end_ms)?,
        })
    }
}

/// Monday 00:00 UTC on or before `at`.
pub fn align_to_week_start(at: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_monday = at.weekday().num_days_from_monday() as i64;
    let monday = at.date_naive() - Duration::days(days_from_monday);
    monday.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_week_window_is_seven_days() {
        let w = DateWindow::week_starting(utc(2024, 1, 1, 0)).unwrap();
        assert_eq!(w.end, utc(2024, 1, 8, 0));
    }

    #[test]
    fn test_next_window_is_contiguous() {
        let w = DateWindow::week_starting(utc(2024, 1, 1, 0)).unwrap();
        let n = w.next().unwrap();
        assert_eq!(n.start, w.end);
        assert_eq!(n.end, utc(2024, 1, 15, 0));
    }

    #[test]
    fn test_window_past_max_date_is_none() {
        assert!(DateWindow::week_starting(DateTime::<Utc>::MAX_UTC).is_none());
        let last = DateWindow::new(
            DateTime::<Utc>::MAX_UTC - Duration::days(10),
            DateTime::<Utc>::MAX_UTC - Duration::days(3),
        );
        assert!(last.next().is_none());
    }

    #[test]
    fn test_contains_is_half_open() {
        let w = DateWindow::week_starting(utc(2024, 1, 1, 0)).unwrap();
        assert!(w.contains(utc(2024, 1, 1, 0)));
        assert!(w.contains(utc(2024, 1, 7, 23)));
        assert!(!w.contains(utc(2024, 1, 8, 0)));
        assert!(!w.contains(utc(2023, 12, 31, 23)));
    }

    #[test]
    fn test_is_elapsed_requires_end_in_past() {
        let w = DateWindow::week_starting(utc(2024, 1, 1, 0)).unwrap();
        assert!(!w.is_elapsed(utc(2024, 1, 8, 0)));
        assert!(w.is_elapsed(utc(2024, 1, 8, 1)));
    }

    #[test]
    fn test_align_to_week_start() {
        // 2024-01-03 is a Wednesday.
        assert_eq!(align_to_week_start(utc(2024, 1, 3, 15)), utc(2024, 1, 1, 0));
        assert_eq!(align_to_week_start(utc(2024, 1, 1, 0)), utc(2024, 1, 1, 0));
        // Sunday belongs to the week that started the previous Monday.
        assert_eq!(align_to_week_start(utc(2024, 1, 7, 23)), utc(2024, 1, 1, 0));
    }

    #[test]
    fn test_window_millis_roundtrip() {
        let w = DateWindow::week_starting(utc(2024, 1, 1, 0)).unwrap();
        let back = DateWindow::from_millis(w.start_ms(), w.end_ms()).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_participant_serializes_as_string() {
        let p = Participant::new("alice");
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"alice\"");
        assert_eq!(p.to_string(), "alice");
    }
}
