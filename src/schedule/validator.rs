//! Per-round exclusivity check for generated or externally built schedules.

use crate::domain::{Participant, Round};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use tracing::error;

/// A single broken invariant in a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScheduleViolation {
    /// A roster participant appears the wrong number of times in a round.
    #[serde(rename_all = "camelCase")]
    AppearanceCount {
        round: u32,
        participant: Participant,
        expected: usize,
        actual: usize,
    },
    /// A fixture or bye names someone who is not on the roster.
    #[serde(rename_all = "camelCase")]
    UnknownParticipant { round: u32, participant: Participant },
}

impl fmt::Display for ScheduleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleViolation::AppearanceCount {
                round,
                participant,
                expected,
                actual,
            } => write!(
                f,
                "Round {}: participant {} appears {} times, expected {}",
                round, participant, actual, expected
            ),
            ScheduleViolation::UnknownParticipant { round, participant } => {
                write!(f, "Round {}: participant {} is not on the roster", round, participant)
            }
        }
    }
}

/// Result of checking a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub rounds_checked: usize,
    pub violations: Vec<ScheduleViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check that every roster participant appears in exactly one fixture per
/// round. The round's `bye` participant, if any, must appear in none.
pub fn check(schedule: &[Round], participants: &[Participant]) -> ValidationReport {
    let roster: HashSet<&Participant> = participants.iter().collect();
    let mut violations = Vec::new();

    for round in schedule {
        let mut counts: HashMap<&Participant, usize> = HashMap::new();
        for pairing in &round.pairings {
            *counts.entry(&pairing.a).or_default() += 1;
            *counts.entry(&pairing.b).or_default() += 1;
        }

        let mut unknown: BTreeSet<&Participant> = counts
            .keys()
            .copied()
            .filter(|p| !roster.contains(p))
            .collect();
        if let Some(bye) = round.bye.as_ref().filter(|b| !roster.contains(b)) {
            unknown.insert(bye);
        }
        violations.extend(unknown.into_iter().map(|p| ScheduleViolation::UnknownParticipant {
            round: round.number,
            participant: p.clone(),
        }));

        for participant in participants {
            let expected = if round.bye.as_ref() == Some(participant) { 0 } else { 1 };
            let actual = counts.get(participant).copied().unwrap_or(0);
            if actual != expected {
                violations.push(ScheduleViolation::AppearanceCount {
                    round: round.number,
                    participant: participant.clone(),
                    expected,
                    actual,
                });
            }
        }
    }

    ValidationReport {
        rounds_checked: schedule.len(),
        violations,
    }
}

/// Boolean form of [`check`]; each violation is logged.
pub fn validate(schedule: &[Round], participants: &[Participant]) -> bool {
    let report = check(schedule, participants);
    for violation in &report.violations {
        error!(%violation, "Schedule validation failed");
    }
    report.is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateWindow, Pairing};
    use chrono::{TimeZone, Utc};

    fn p(name: &str) -> Participant {
        Participant::new(name)
    }

    fn missing(round: u32, name: &str) -> ScheduleViolation {
        ScheduleViolation::AppearanceCount {
            round,
            participant: p(name),
            expected: 1,
            actual: 0,
        }
    }

    fn round(number: u32, pairs: &[(&str, &str)], bye: Option<&str>) -> Round {
        Round {
            number,
            season: 1,
            window: DateWindow::week_starting(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
                .unwrap(),
            pairings: pairs.iter().map(|(a, b)| Pairing::new(p(a), p(b))).collect(),
            bye: bye.map(p),
        }
    }

    #[test]
    fn test_valid_round_passes() {
        let roster = vec![p("A"), p("B"), p("C"), p("D")];
        let schedule = vec![round(1, &[("A", "D"), ("B", "C")], None)];
        assert!(validate(&schedule, &roster));
        assert_eq!(check(&schedule, &roster).rounds_checked, 1);
    }

    #[test]
    fn test_missing_participant_reported() {
        let roster = vec![p("A"), p("B"), p("C"), p("D")];
        let schedule = vec![round(1, &[("A", "D")], None)];
        let report = check(&schedule, &roster);
        assert!(!report.is_valid());
        assert_eq!(
            report.violations,
            vec![
                missing(1, "B"),
                missing(1, "C"),
            ]
        );
    }

    #[test]
    fn test_double_booking_reported() {
        let roster = vec![p("A"), p("B"), p("C"), p("D")];
        let schedule = vec![round(2, &[("A", "B"), ("A", "C")], None)];
        let report = check(&schedule, &roster);
        assert!(report.violations.contains(&ScheduleViolation::AppearanceCount {
            round: 2,
            participant: p("A"),
            expected: 1,
            actual: 2,
        }));
        assert!(!validate(&schedule, &roster));
    }

    #[test]
    fn test_unknown_participant_reported() {
        let roster = vec![p("A"), p("B")];
        let schedule = vec![round(1, &[("A", "Z")], None)];
        let report = check(&schedule, &roster);
        assert!(report
            .violations
            .contains(&ScheduleViolation::UnknownParticipant { round: 1, participant: p("Z") }));
    }

    #[test]
    fn test_bye_participant_expected_absent() {
        let roster = vec![p("A"), p("B"), p("C")];
        assert!(validate(&[round(1, &[("B", "C")], Some("A"))], &roster));

        let report = check(&[round(1, &[("A", "B")], Some("A"))], &roster);
        assert!(report.violations.contains(&ScheduleViolation::AppearanceCount {
            round: 1,
            participant: p("A"),
            expected: 0,
            actual: 1,
        }));
    }

    #[test]
    fn test_violation_display() {
        let v = missing(3, "A");
        assert_eq!(v.to_string(), "Round 3: participant A appears 0 times, expected 1");
    }
}
