//! Mock data source for testing without a database.

use super::{DataSource, DataSourceError};
use crate::domain::{DateWindow, LogEntry, Participant, ParticipantRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock data source that returns predefined test data.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    participants: HashMap<Participant, i64>,
    logs: Vec<LogEntry>,
    /// Number of leading `fetch_logs` calls that fail with a transient error.
    transient_failures: Arc<AtomicUsize>,
    failing_participants: Vec<i64>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant under `id`.
    pub fn with_participant(mut self, name: &str, id: i64) -> Self {
        self.participants.insert(Participant::new(name), id);
        self
    }

    pub fn with_log(mut self, entry: LogEntry) -> Self {
        self.logs.push(entry);
        self
    }

    pub fn with_logs(mut self, entries: Vec<LogEntry>) -> Self {
        self.logs.extend(entries);
        self
    }

    /// Fail the next `count` log fetches with `DataSourceError::Unavailable`.
    pub fn with_transient_failures(self, count: usize) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Always fail log fetches for `participant_id` with a permanent error.
    pub fn with_failing_participant(mut self, participant_id: i64) -> Self {
        self.failing_participants.push(participant_id);
        self
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn resolve_participant(
        &self,
        participant: &Participant,
    ) -> Result<Option<ParticipantRecord>, DataSourceError> {
        Ok(self.participants.get(participant).map(|&id| ParticipantRecord {
            id,
            name: participant.clone(),
        }))
    }

    async fn fetch_logs(
        &self,
        participant_id: i64,
        window: &DateWindow,
    ) -> Result<Vec<LogEntry>, DataSourceError> {
        let took_failure = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if took_failure {
            return Err(DataSourceError::Unavailable("mock outage".to_string()));
        }
        if self.failing_participants.contains(&participant_id) {
            return Err(DataSourceError::Other(format!(
                "logs unavailable for {}",
                participant_id
            )));
        }

        let mut entries: Vec<LogEntry> = self
            .logs
            .iter()
            .filter(|e| e.participant_id == participant_id && window.contains(e.logged_at))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.logged_at);
        Ok(entries)
    }
}
