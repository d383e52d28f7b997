//! SQLite-backed identity and log store.

use super::{DataSource, DataSourceError};
use crate::domain::{DateWindow, LogEntry, Participant, ParticipantRecord, Points};
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::debug;

/// Reads `participants`, `substances` and `substance_logs`.
#[derive(Debug, Clone)]
pub struct SqliteDataSource {
    pool: SqlitePool,
}

impl SqliteDataSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataSource for SqliteDataSource {
    async fn resolve_participant(
        &self,
        participant: &Participant,
    ) -> Result<Option<ParticipantRecord>, DataSourceError> {
        let row = sqlx::query("SELECT id, name FROM participants WHERE name = ?")
            .bind(participant.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| ParticipantRecord {
            id: row.get("id"),
            name: Participant::new(row.get::<String, _>("name")),
        }))
    }

    async fn fetch_logs(
        &self,
        participant_id: i64,
        window: &DateWindow,
    ) -> Result<Vec<LogEntry>, DataSourceError> {
        debug!(
            participant_id,
            start_ms = window.start_ms(),
            end_ms = window.end_ms(),
            "Fetching substance logs"
        );

        let rows = sqlx::query(
            r#"
            SELECT l.logged_at_ms, l.points, s.points AS base_points
            FROM substance_logs l
            JOIN substances s ON l.substance_id = s.id
            WHERE l.participant_id = ? AND l.logged_at_ms >= ? AND l.logged_at_ms < ?
            ORDER BY l.logged_at_ms ASC, l.id ASC
            "#,
        )
        .bind(participant_id)
        .bind(window.start_ms())
        .bind(window.end_ms())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let logged_at_ms: i64 = row.get("logged_at_ms");
                let points_str: String = row.get("points");
                let base_str: String = row.get("base_points");

                let logged_at = DateTime::from_timestamp_millis(logged_at_ms).ok_or_else(|| {
                    DataSourceError::ParseError(format!("timestamp out of range: {}", logged_at_ms))
                })?;
                let points = Points::from_str_canonical(&points_str).map_err(|e| {
                    DataSourceError::ParseError(format!("log points {:?}: {}", points_str, e))
                })?;
                let base_points = Points::from_str_canonical(&base_str).map_err(|e| {
                    DataSourceError::ParseError(format!("substance points {:?}: {}", base_str, e))
                })?;

                Ok(LogEntry::new(
                    participant_id,
                    logged_at,
                    points,
                    base_points.is_positive(),
                ))
            })
            .collect()
    }
}
