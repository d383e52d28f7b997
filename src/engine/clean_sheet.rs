//! Clean-sheet bonus: participants with no harmful entries in a window get a
//! fixed adjustment added to their total.

use crate::domain::{LogEntry, Points};
use serde::{Deserialize, Serialize};

/// Per-participant totals for one fixture window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    /// Sum of logged points before any bonus.
    pub raw: Points,
    /// Total used for scoring.
    pub total: Points,
    pub clean_sheet: bool,
    pub harmful_entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSheetRule {
    /// Added to the total on a clean sheet. Normally negative.
    pub bonus: Points,
}

impl CleanSheetRule {
    pub fn new(bonus: Points) -> Self {
        Self { bonus }
    }

    /// Sum `entries` and apply the bonus when none of them is harmful.
    pub fn tally(&self, entries: &[LogEntry]) -> Tally {
        let raw: Points = entries.iter().map(|e| e.points).sum();
        let harmful_entries = entries.iter().filter(|e| e.is_harmful).count();
        let clean_sheet = harmful_entries == 0;
        let total = if clean_sheet { raw + self.bonus } else { raw };

        Tally {
            raw,
            total,
            clean_sheet,
            harmful_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(points: &str, is_harmful: bool) -> LogEntry {
        LogEntry::new(
            1,
            Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap(),
            Points::from_str_canonical(points).unwrap(),
            is_harmful,
        )
    }

    fn rule() -> CleanSheetRule {
        CleanSheetRule::new(Points::from(-1))
    }

    #[test]
    fn test_no_harmful_entries_earns_bonus() {
        let tally = rule().tally(&[entry("-0.5", false), entry("-0.5", false)]);
        assert_eq!(tally.raw, Points::from(-1));
        assert_eq!(tally.total, Points::from(-2));
        assert!(tally.clean_sheet);
    }

    #[test]
    fn test_harmful_entry_blocks_bonus() {
        let tally = rule().tally(&[entry("4", true), entry("-0.5", false)]);
        assert_eq!(tally.raw, Points::from_str_canonical("3.5").unwrap());
        assert_eq!(tally.total, tally.raw);
        assert!(!tally.clean_sheet);
        assert_eq!(tally.harmful_entries, 1);
    }

    #[test]
    fn test_empty_window_is_clean_sheet() {
        let tally = rule().tally(&[]);
        assert_eq!(tally.raw, Points::zero());
        assert_eq!(tally.total, Points::from(-1));
        assert!(tally.clean_sheet);
    }

    #[test]
    fn test_harmfulness_is_not_inferred_from_logged_points() {
        // A zero-point entry for a harmful item still breaks the clean sheet.
        let tally = rule().tally(&[entry("0", true)]);
        assert!(!tally.clean_sheet);
        assert_eq!(tally.total, Points::zero());
    }
}
