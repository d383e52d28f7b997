//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `fixtures.rs` - Season schedules, fixture queries and result writes
//! - `catalog.rs` - Participants, substances and substance logs

mod catalog;
mod fixtures;

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

/// Round numbers present in a season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundIndex {
    pub all: Vec<u32>,
    /// Rounds with at least one fixture still unprocessed.
    pub unprocessed: Vec<u32>,
}

impl RoundIndex {
    pub fn total_rounds(&self) -> usize {
        self.all.len()
    }
}

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}

pub(crate) fn decode_error(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}
