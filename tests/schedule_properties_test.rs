use chrono::{Duration, TimeZone, Utc};
use matchweek::domain::Participant;
use matchweek::schedule::{analyze, check, generate, validate, ByePolicy, ScheduleError};
use std::collections::{BTreeMap, BTreeSet};

fn roster(n: usize) -> Vec<Participant> {
    (0..n).map(|i| Participant::new(format!("P{:02}", i))).collect()
}

#[test]
fn test_even_rosters_cover_every_pair_twice() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for n in [2usize, 4, 6, 8, 10, 16] {
        let players = roster(n);
        let schedule = generate(start, &players, 1, ByePolicy::Reject).unwrap();

        assert_eq!(schedule.len(), 2 * (n - 1), "rounds for n={}", n);
        assert!(schedule.iter().all(|r| r.pairings.len() == n / 2));

        let analysis = analyze(&schedule, &players);
        assert!(analysis.every_pair_meets(2), "n={}: {:?}", n, analysis.missing_matchups);

        // One meeting per half, roles swapped.
        let half = n - 1;
        let first: BTreeSet<(String, String)> = schedule[..half]
            .iter()
            .flat_map(|r| r.pairings.iter())
            .map(|p| (p.a.to_string(), p.b.to_string()))
            .collect();
        let second: BTreeSet<(String, String)> = schedule[half..]
            .iter()
            .flat_map(|r| r.pairings.iter())
            .map(|p| (p.b.to_string(), p.a.to_string()))
            .collect();
        assert_eq!(first, second);
    }
}

#[test]
fn test_each_participant_plays_once_per_round() {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
    let players = roster(12);
    let schedule = generate(start, &players, 3, ByePolicy::Reject).unwrap();

    assert!(validate(&schedule, &players));
    let report = check(&schedule, &players);
    assert_eq!(report.rounds_checked, 22);
    assert!(report.violations.is_empty());
}

#[test]
fn test_round_windows_are_contiguous() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let schedule = generate(start, &roster(6), 1, ByePolicy::Reject).unwrap();

    assert_eq!(schedule[0].window.start, start);
    for pair in schedule.windows(2) {
        assert_eq!(pair[1].window.start, pair[0].window.end);
        assert_eq!(pair[0].window.end - pair[0].window.start, Duration::days(7));
    }
    let numbers: Vec<u32> = schedule.iter().map(|r| r.number).collect();
    assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_odd_roster_gives_each_participant_one_bye_per_half() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let players = roster(5);

    assert_eq!(
        generate(start, &players, 1, ByePolicy::Reject).unwrap_err(),
        ScheduleError::OddRosterRequiresExplicitBye { count: 5 }
    );

    let schedule = generate(start, &players, 1, ByePolicy::Allow).unwrap();
    assert_eq!(schedule.len(), 10);
    assert!(validate(&schedule, &players));

    let mut byes: BTreeMap<Participant, u32> = BTreeMap::new();
    for round in &schedule[..5] {
        let bye = round.bye.clone().expect("odd roster round without a bye");
        assert!(!round.pairings.iter().any(|p| p.involves(&bye)));
        assert_eq!(round.pairings.len(), 2);
        *byes.entry(bye).or_default() += 1;
    }
    assert_eq!(byes.len(), 5);
    assert!(byes.values().all(|&count| count == 1));
}
