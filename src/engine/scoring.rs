//! Fixture scoring: lower total wins, league points 3/1/0.

use super::Tally;
use crate::domain::{Fixture, FixtureResult, FixtureState, Points, Winner};
use thiserror::Error;

pub const WIN_POINTS: u32 = 3;
pub const DRAW_POINTS: u32 = 1;
pub const LOSS_POINTS: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("fixture {0} is already processed")]
    AlreadyProcessed(String),
}

/// Decide the winner and league points for two totals.
///
/// Returns `(winner, league_points_a, league_points_b)`.
pub fn decide(points_a: Points, points_b: Points) -> (Winner, u32, u32) {
    if points_a < points_b {
        (Winner::A, WIN_POINTS, LOSS_POINTS)
    } else if points_a > points_b {
        (Winner::B, LOSS_POINTS, WIN_POINTS)
    } else {
        (Winner::Draw, DRAW_POINTS, DRAW_POINTS)
    }
}

/// Score a fixture from plain totals, with no clean sheets recorded.
///
/// # Errors
/// Returns `ScoringError::AlreadyProcessed` if the fixture was scored before.
pub fn score(
    fixture: &mut Fixture,
    points_a: Points,
    points_b: Points,
) -> Result<FixtureResult, ScoringError> {
    transition(fixture, points_a, points_b, false, false)
}

/// Score a fixture from per-participant tallies, carrying clean-sheet flags.
///
/// # Errors
/// Returns `ScoringError::AlreadyProcessed` if the fixture was scored before.
pub fn score_tallies(
    fixture: &mut Fixture,
    tally_a: &Tally,
    tally_b: &Tally,
) -> Result<FixtureResult, ScoringError> {
    transition(
        fixture,
        tally_a.total,
        tally_b.total,
        tally_a.clean_sheet,
        tally_b.clean_sheet,
    )
}

fn transition(
    fixture: &mut Fixture,
    points_a: Points,
    points_b: Points,
    clean_sheet_a: bool,
    clean_sheet_b: bool,
) -> Result<FixtureResult, ScoringError> {
    if fixture.is_processed() {
        return Err(ScoringError::AlreadyProcessed(fixture.key.clone()));
    }

    let (winner, league_points_a, league_points_b) = decide(points_a, points_b);
    let result = FixtureResult {
        points_a,
        points_b,
        clean_sheet_a,
        clean_sheet_b,
        winner,
        league_points_a,
        league_points_b,
    };
    fixture.state = FixtureState::Processed(result.clone());
    Ok(result)
}
