//! Scheduled rounds and the pairings inside them.

use crate::domain::{DateWindow, Fixture, Participant};
use serde::{Deserialize, Serialize};

/// One head-to-head pairing. `a` is the home side of the fixture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    pub a: Participant,
    pub b: Participant,
}

impl Pairing {
    pub fn new(a: Participant, b: Participant) -> Self {
        Pairing { a, b }
    }

    /// The same pairing with roles swapped.
    pub fn reversed(&self) -> Self {
        Pairing {
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }

    pub fn involves(&self, participant: &Participant) -> bool {
        &self.a == participant || &self.b == participant
    }
}

/// A round (week) of a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// 1-based, sequential within the season.
    pub number: u32,
    pub season: u32,
    pub window: DateWindow,
    pub pairings: Vec<Pairing>,
    /// Participant sitting out this round, only for odd rosters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bye: Option<Participant>,
}

impl Round {
    /// Materialize the round's pairings as unprocessed fixtures.
    pub fn fixtures(&self) -> Vec<Fixture> {
        self.pairings
            .iter()
            .map(|p| {
                Fixture::new(
                    self.season,
                    self.number,
                    p.a.clone(),
                    p.b.clone(),
                    self.window,
                )
            })
            .collect()
    }
}
