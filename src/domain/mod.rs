//! Domain types for the league: participants, points, rounds, and fixtures.
//!
//! This module provides:
//! - Lossless point arithmetic via the `Points` wrapper
//! - Round windows (`DateWindow`) and week alignment
//! - `Round`/`Pairing` as produced by the scheduler
//! - `Fixture` with its explicit `Unprocessed -> Processed` state

pub mod fixture;
pub mod log_entry;
pub mod points;
pub mod primitives;
pub mod round;

pub use fixture::{Fixture, FixtureResult, FixtureState, Winner};
pub use log_entry::LogEntry;
pub use points::Points;
pub use primitives::{
    align_to_week_start, DateWindow, Participant, ParticipantRecord, ROUND_LENGTH_DAYS,
};
pub use round::{Pairing, Round};
