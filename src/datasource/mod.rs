//! Data source abstraction for participant identities and consumption logs.

use crate::domain::{DateWindow, LogEntry, Participant, ParticipantRecord};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod sqlite;

pub use mock::MockDataSource;
pub use sqlite::SqliteDataSource;

/// External collaborator supplying identities and logs to the week processor.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Resolve a roster name to its identity record.
    ///
    /// # Returns
    /// `None` if the participant has not been onboarded.
    async fn resolve_participant(
        &self,
        participant: &Participant,
    ) -> Result<Option<ParticipantRecord>, DataSourceError>;

    /// Fetch a participant's log entries inside `window` (`start` inclusive,
    /// `end` exclusive), ordered by time.
    async fn fetch_logs(
        &self,
        participant_id: i64,
        window: &DateWindow,
    ) -> Result<Vec<LogEntry>, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Store temporarily unavailable (busy, locked, connection dropped).
    Unavailable(String),
    /// Stored data could not be decoded.
    ParseError(String),
    /// Other error
    Other(String),
}

impl DataSourceError {
    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DataSourceError::Unavailable(_))
    }
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::Unavailable(msg) => write!(f, "Source unavailable: {}", msg),
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<sqlx::Error> for DataSourceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DataSourceError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(ref db)
                if matches!(db.code().as_deref(), Some("5") | Some("6")) =>
            {
                // SQLITE_BUSY / SQLITE_LOCKED
                DataSourceError::Unavailable(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DataSourceError::ParseError(err.to_string())
            }
            other => DataSourceError::Other(other.to_string()),
        }
    }
}
