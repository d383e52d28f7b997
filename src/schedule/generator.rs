//! Double round-robin generation using the circle method.

use super::ScheduleError;
use crate::domain::{DateWindow, Pairing, Participant, Round};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// How to treat a roster with an odd number of participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByePolicy {
    /// Refuse odd rosters.
    #[default]
    Reject,
    /// Pad with an empty slot; whoever meets it sits the round out.
    Allow,
}

/// Generate a double round-robin for `participants` starting at `start`.
///
/// The first half is a single round-robin of `n - 1` rounds (where `n`
/// includes the padding slot for odd rosters). The second half replays it
/// with roles swapped. Every round lasts one week and the windows are
/// back-to-back.
///
/// # Errors
/// Returns an error for fewer than two participants, duplicate names, a zero
/// season, or an odd roster under `ByePolicy::Reject`.
pub fn generate(
    start: DateTime<Utc>,
    participants: &[Participant],
    season: u32,
    bye_policy: ByePolicy,
) -> Result<Vec<Round>, ScheduleError> {
    if season == 0 {
        return Err(ScheduleError::InvalidSeason);
    }
    if participants.len() < 2 {
        return Err(ScheduleError::TooFewParticipants {
            count: participants.len(),
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p) {
            return Err(ScheduleError::DuplicateParticipant(p.clone()));
        }
    }

    let odd = participants.len() % 2 != 0;
    if odd && bye_policy == ByePolicy::Reject {
        return Err(ScheduleError::OddRosterRequiresExplicitBye {
            count: participants.len(),
        });
    }

    // `None` is the padding slot.
    let mut slots: Vec<Option<&Participant>> = participants.iter().map(Some).collect();
    if odd {
        slots.push(None);
    }

    let n = slots.len();
    let rounds_per_half = n - 1;
    let windows = round_windows(start, 2 * rounds_per_half)
        .ok_or(ScheduleError::DateOutOfRange { start })?;
    let mut first_half: Vec<Round> = Vec::with_capacity(rounds_per_half);

    for index in 0..rounds_per_half {
        let mut pairings = Vec::with_capacity(n / 2);
        let mut bye = None;

        for i in 0..n / 2 {
            match (slots[i], slots[n - 1 - i]) {
                (Some(a), Some(b)) => pairings.push(Pairing::new(a.clone(), b.clone())),
                (Some(p), None) | (None, Some(p)) => bye = Some(p.clone()),
                (None, None) => {}
            }
        }

        first_half.push(Round {
            number: index as u32 + 1,
            season,
            window: windows[index],
            pairings,
            bye,
        });

        rotate(&mut slots);
    }

    let second_half: Vec<Round> = first_half
        .iter()
        .zip(&windows[rounds_per_half..])
        .map(|(base, window)| Round {
            number: base.number + rounds_per_half as u32,
            season,
            window: *window,
            pairings: base.pairings.iter().map(Pairing::reversed).collect(),
            bye: base.bye.clone(),
        })
        .collect();
    let mut schedule = first_half;
    schedule.extend(second_half);

    debug!(
        season,
        participants = participants.len(),
        rounds = schedule.len(),
        "Generated double round-robin"
    );

    Ok(schedule)
}

/// `count` back-to-back week windows from `start`; `None` past the chrono range.
fn round_windows(start: DateTime<Utc>, count: usize) -> Option<Vec<DateWindow>> {
    let mut windows = Vec::with_capacity(count);
    let mut window = DateWindow::week_starting(start)?;
    for index in 0..count {
        windows.push(window);
        if index + 1 < count {
            window = window.next()?;
        }
    }
    Some(windows)
}

/// Keep slot 0 fixed and move the last slot into position 1.
fn rotate<T>(slots: &mut [T]) {
    if slots.len() > 2 {
        slots[1..].rotate_right(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn roster(names: &[&str]) -> Vec<Participant> {
        names.iter().map(|n| Participant::new(*n)).collect()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn names(round: &Round) -> Vec<(&str, &str)> {
        round
            .pairings
            .iter()
            .map(|p| (p.a.as_str(), p.b.as_str()))
            .collect()
    }

    #[test]
    fn test_rotate_keeps_pivot() {
        let mut v = vec![0, 1, 2, 3];
        rotate(&mut v);
        assert_eq!(v, vec![0, 3, 1, 2]);
        rotate(&mut v);
        assert_eq!(v, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_four_player_rounds() {
        let players = roster(&["A", "B", "C", "D"]);
        let schedule = generate(start(), &players, 1, ByePolicy::Reject).unwrap();
        assert_eq!(schedule.len(), 6);
        assert_eq!(names(&schedule[0]), vec![("A", "D"), ("B", "C")]);
        assert_eq!(names(&schedule[1]), vec![("A", "C"), ("D", "B")]);
        assert_eq!(names(&schedule[2]), vec![("A", "B"), ("C", "D")]);
        assert_eq!(names(&schedule[3]), vec![("D", "A"), ("C", "B")]);
        assert_eq!(
            schedule[3].window.start,
            Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_round_numbers_are_sequential() {
        let players = roster(&["A", "B", "C", "D", "E", "F"]);
        let schedule = generate(start(), &players, 3, ByePolicy::Reject).unwrap();
        for (i, round) in schedule.iter().enumerate() {
            assert_eq!(round.number, i as u32 + 1);
            assert_eq!(round.season, 3);
            assert!(round.bye.is_none());
        }
    }

    #[test]
    fn test_two_players() {
        let schedule = generate(start(), &roster(&["A", "B"]), 1, ByePolicy::Reject).unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(names(&schedule[0]), vec![("A", "B")]);
        assert_eq!(names(&schedule[1]), vec![("B", "A")]);
    }

    #[test]
    fn test_too_few_participants() {
        let err = generate(start(), &roster(&["A"]), 1, ByePolicy::Allow).unwrap_err();
        assert_eq!(err, ScheduleError::TooFewParticipants { count: 1 });
        let err = generate(start(), &[], 1, ByePolicy::Allow).unwrap_err();
        assert_eq!(err, ScheduleError::TooFewParticipants { count: 0 });
    }

    #[test]
    fn test_odd_roster_rejected_by_default() {
        let players = roster(&["A", "B", "C"]);
        let err = generate(start(), &players, 1, ByePolicy::default()).unwrap_err();
        assert_eq!(err, ScheduleError::OddRosterRequiresExplicitBye { count: 3 });
    }

    #[test]
    fn test_odd_roster_with_byes() {
        let schedule = generate(start(), &roster(&["A", "B", "C"]), 1, ByePolicy::Allow).unwrap();
        assert_eq!(schedule.len(), 6);
        for round in &schedule {
            assert_eq!(round.pairings.len(), 1);
            assert!(round.bye.is_some());
        }
        assert_eq!(schedule[0].bye, Some(Participant::new("A")));
    }

    #[test]
    fn test_duplicate_participant_rejected() {
        let players = roster(&["A", "B", "A", "C"]);
        let err = generate(start(), &players, 1, ByePolicy::Reject).unwrap_err();
        assert_eq!(err, ScheduleError::DuplicateParticipant(Participant::new("A")));
    }

    #[test]
    fn test_season_zero_rejected() {
        let err = generate(start(), &roster(&["A", "B"]), 0, ByePolicy::Reject).unwrap_err();
        assert_eq!(err, ScheduleError::InvalidSeason);
    }

    #[test]
    fn test_start_near_max_date_rejected() {
        // Round 1 fits but the sixth round would overflow.
        let late = DateTime::<Utc>::MAX_UTC - chrono::Duration::days(20);
        let err = generate(late, &roster(&["A", "B", "C", "D"]), 1, ByePolicy::Reject).unwrap_err();
        assert_eq!(err, ScheduleError::DateOutOfRange { start: late });
    }
}
