//! Season scheduling: round-robin generation, validation, and coverage analysis.

use crate::domain::Participant;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod analysis;
pub mod generator;
pub mod validator;

pub use analysis::{analyze, ScheduleAnalysis};
pub use generator::{generate, ByePolicy};
pub use validator::{check, validate, ScheduleViolation, ValidationReport};

/// Rejected scheduling preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("at least 2 participants are required, got {count}")]
    TooFewParticipants { count: usize },
    #[error("roster of {count} participants is odd; byes must be allowed explicitly")]
    OddRosterRequiresExplicitBye { count: usize },
    #[error("participant {0} is listed more than once")]
    DuplicateParticipant(Participant),
    #[error("season must be a positive integer")]
    InvalidSeason,
    #[error("a season starting at {start} runs past the supported date range")]
    DateOutOfRange { start: DateTime<Utc> },
}
