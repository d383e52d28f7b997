//! League table from processed fixtures.

use crate::domain::{Fixture, Participant, Points, Winner};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: usize,
    pub participant: Participant,
    pub league_points: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    /// Sum of the scored totals across played fixtures. Lower is better.
    pub substance_points: Points,
}

impl Standing {
    fn empty(participant: Participant) -> Self {
        Standing {
            rank: 0,
            participant,
            league_points: 0,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            substance_points: Points::zero(),
        }
    }
}

/// Build the table for `roster` from `fixtures`.
///
/// Unprocessed fixtures and fixtures involving participants outside the roster
/// are ignored. Ordering: league points descending, then substance points
/// ascending, then participant name.
pub fn compute_standings(roster: &[Participant], fixtures: &[Fixture]) -> Vec<Standing> {
    let mut table: HashMap<&Participant, Standing> = roster
        .iter()
        .map(|p| (p, Standing::empty(p.clone())))
        .collect();

    for fixture in fixtures {
        let Some(result) = fixture.result() else {
            continue;
        };

        let sides = [
            (&fixture.participant_a, result.league_points_a, result.points_a, Winner::A),
            (&fixture.participant_b, result.league_points_b, result.points_b, Winner::B),
        ];
        for (participant, league_points, points, own_side) in sides {
            let Some(row) = table.get_mut(participant) else {
                continue;
            };
            row.league_points += league_points;
            row.substance_points += points;
            row.played += 1;
            match result.winner {
                Winner::Draw => row.draws += 1,
                w if w == own_side => row.wins += 1,
                _ => row.losses += 1,
            }
        }
    }

    let mut standings: Vec<Standing> = table.into_values().collect();
    standings.sort_by(|x, y| {
        y.league_points
            .cmp(&x.league_points)
            .then(x.substance_points.cmp(&y.substance_points))
            .then(x.participant.cmp(&y.participant))
    });
    for (index, standing) in standings.iter_mut().enumerate() {
        standing.rank = index + 1;
    }
    standings
}
