//! Fixture (match) type and its two-state lifecycle.

use crate::domain::{DateWindow, Participant, Points};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outcome of a scored fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// Participant A had the lower total.
    A,
    /// Participant B had the lower total.
    B,
    Draw,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::A => "a",
            Winner::B => "b",
            Winner::Draw => "draw",
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Winner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Winner::A),
            "b" => Ok(Winner::B),
            "draw" => Ok(Winner::Draw),
            other => Err(format!("unknown winner: {}", other)),
        }
    }
}

/// Scored fields of a processed fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureResult {
    pub points_a: Points,
    pub points_b: Points,
    pub clean_sheet_a: bool,
    pub clean_sheet_b: bool,
    pub winner: Winner,
    pub league_points_a: u32,
    pub league_points_b: u32,
}

/// `Unprocessed -> Processed` is one-way. Unscored points are absent, not zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "lowercase")]
pub enum FixtureState {
    #[default]
    Unprocessed,
    Processed(FixtureResult),
}

/// A scheduled head-to-head match within one round of a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Stable unique identifier derived from (season, round, a, b).
    pub key: String,
    pub season: u32,
    pub round_number: u32,
    pub participant_a: Participant,
    pub participant_b: Participant,
    pub window: DateWindow,
    pub state: FixtureState,
}

impl Fixture {
    /// Create an unprocessed fixture and compute its key.
    pub fn new(
        season: u32,
        round_number: u32,
        participant_a: Participant,
        participant_b: Participant,
        window: DateWindow,
    ) -> Self {
        let key = Self::compute_key(season, round_number, &participant_a, &participant_b);
        Fixture {
            key,
            season,
            round_number,
            participant_a,
            participant_b,
            window,
            state: FixtureState::Unprocessed,
        }
    }

    /// Hash of the identifying fields, length-prefixed so names cannot collide
    /// by concatenation.
    pub fn compute_key(season: u32, round_number: u32, a: &Participant, b: &Participant) -> String {
        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hasher.update(season.to_le_bytes());
        hasher.update(round_number.to_le_bytes());
        hash_var(&mut hasher, a.as_str());
        hash_var(&mut hasher, b.as_str());

        let hash = hasher.finalize();
        format!("fx:{}", hex::encode(&hash[..16]))
    }

    pub fn is_processed(&self) -> bool {
        matches!(self.state, FixtureState::Processed(_))
    }

    pub fn result(&self) -> Option<&FixtureResult> {
        match &self.state {
            FixtureState::Processed(result) => Some(result),
            FixtureState::Unprocessed => None,
        }
    }

    pub fn points_a(&self) -> Option<Points> {
        self.result().map(|r| r.points_a)
    }

    pub fn points_b(&self) -> Option<Points> {
        self.result().map(|r| r.points_b)
    }

    pub fn winner(&self) -> Option<Winner> {
        self.result().map(|r| r.winner)
    }

    /// The winning participant, or `None` for a draw or an unprocessed fixture.
    pub fn winning_participant(&self) -> Option<&Participant> {
        match self.winner()? {
            Winner::A => Some(&self.participant_a),
            Winner::B => Some(&self.participant_b),
            Winner::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> DateWindow {
        DateWindow::week_starting(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_new_fixture_is_unprocessed_with_no_points() {
        let f = Fixture::new(1, 1, "alice".into(), "bob".into(), window());
        assert!(!f.is_processed());
        assert_eq!(f.points_a(), None);
        assert_eq!(f.points_b(), None);
        assert_eq!(f.winner(), None);
        assert_eq!(f.winning_participant(), None);
    }

    #[test]
    fn test_key_is_deterministic_and_role_sensitive() {
        let a = Participant::new("alice");
        let b = Participant::new("bob");
        let k1 = Fixture::compute_key(1, 1, &a, &b);
        let k2 = Fixture::compute_key(1, 1, &a, &b);
        let swapped = Fixture::compute_key(1, 1, &b, &a);
        let other_round = Fixture::compute_key(1, 2, &a, &b);
        assert_eq!(k1, k2);
        assert_ne!(k1, swapped);
        assert_ne!(k1, other_round);
        assert!(k1.starts_with("fx:"));
        assert_eq!(k1.len(), 3 + 32);
    }

    #[test]
    fn test_key_length_prefix_prevents_concatenation_collisions() {
        let k1 = Fixture::compute_key(1, 1, &"ab".into(), &"c".into());
        let k2 = Fixture::compute_key(1, 1, &"a".into(), &"bc".into());
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_winner_parse_roundtrip() {
        for w in [Winner::A, Winner::B, Winner::Draw] {
            assert_eq!(w.as_str().parse::<Winner>().unwrap(), w);
        }
        assert!("player1".parse::<Winner>().is_err());
    }

    #[test]
    fn test_state_serialization_is_tagged() {
        let f = Fixture::new(1, 1, "alice".into(), "bob".into(), window());
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["state"]["status"], "unprocessed");
        assert_eq!(json["participantA"], "alice");
        assert_eq!(json["roundNumber"], 1);
    }
}
