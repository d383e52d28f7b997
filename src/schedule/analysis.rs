//! Head-to-head coverage analysis of a schedule.

use crate::domain::{Participant, Round};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of who meets whom across a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAnalysis {
    /// `matchups[x][y]` is how many fixtures pair `x` with `y`, in either role.
    pub matchups: BTreeMap<Participant, BTreeMap<Participant, u32>>,
    /// Unordered roster pairs that never meet.
    pub missing_matchups: Vec<(Participant, Participant)>,
    pub total_rounds: usize,
    pub fixtures_per_round: usize,
}

impl ScheduleAnalysis {
    /// True when every distinct roster pair meets exactly `times` times.
    pub fn every_pair_meets(&self, times: u32) -> bool {
        self.matchups
            .values()
            .all(|row| row.values().all(|&count| count == times))
    }
}

pub fn analyze(schedule: &[Round], participants: &[Participant]) -> ScheduleAnalysis {
    let mut matchups: BTreeMap<Participant, BTreeMap<Participant, u32>> = BTreeMap::new();
    for x in participants {
        let row = matchups.entry(x.clone()).or_default();
        for y in participants.iter().filter(|y| *y != x) {
            row.insert(y.clone(), 0);
        }
    }

    for pairing in schedule.iter().flat_map(|r| &r.pairings) {
        *matchups
            .entry(pairing.a.clone())
            .or_default()
            .entry(pairing.b.clone())
            .or_default() += 1;
        *matchups
            .entry(pairing.b.clone())
            .or_default()
            .entry(pairing.a.clone())
            .or_default() += 1;
    }

    let mut missing_matchups = Vec::new();
    for (i, x) in participants.iter().enumerate() {
        for y in &participants[i + 1..] {
            let met = matchups.get(x).and_then(|row| row.get(y)).copied().unwrap_or(0);
            if met == 0 {
                missing_matchups.push((x.clone(), y.clone()));
            }
        }
    }

    ScheduleAnalysis {
        matchups,
        missing_matchups,
        total_rounds: schedule.len(),
        fixtures_per_round: schedule.first().map(|r| r.pairings.len()).unwrap_or(0),
    }
}
