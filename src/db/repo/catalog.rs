//! Participant, substance, and log operations for the repository.

use crate::domain::{Participant, Points};
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::Repository;

impl Repository {
    /// Insert a participant, or return the existing id for that name.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_participant(&self, name: &Participant) -> Result<i64, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO participants (name, created_at)
            VALUES (?, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(name.as_str())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT id FROM participants WHERE name = ?")
            .bind(name.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("id"))
    }

    /// Insert or update a catalog substance and return its id.
    ///
    /// Items with positive `points` count as harmful for clean sheets.
    pub async fn upsert_substance(
        &self,
        name: &str,
        points: Points,
        category: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO substances (name, points, category)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET points = excluded.points, category = excluded.category
            "#,
        )
        .bind(name)
        .bind(points.to_canonical_string())
        .bind(category)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT id FROM substances WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("id"))
    }

    /// Record a consumption event, charging the substance's current catalog points.
    ///
    /// # Errors
    /// Returns `RowNotFound` if the substance does not exist.
    pub async fn insert_log(
        &self,
        participant_id: i64,
        substance_id: i64,
        logged_at: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT points FROM substances WHERE id = ?")
            .bind(substance_id)
            .fetch_one(&self.pool)
            .await?;
        let points: String = row.get("points");

        let result = sqlx::query(
            r#"
            INSERT INTO substance_logs
                (participant_id, substance_id, logged_at_ms, points, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(participant_id)
        .bind(substance_id)
        .bind(logged_at.timestamp_millis())
        .bind(points)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
