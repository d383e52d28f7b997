//! Season schedule and fixture operations for the repository.

use crate::domain::{
    DateWindow, Fixture, FixtureResult, FixtureState, Participant, Points, Round, Winner,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::info;

use super::{decode_error, Repository, RoundIndex};

const FIXTURE_COLUMNS: &str = r#"
    fixture_key, season, round_number, participant_a, participant_b, start_ms, end_ms,
    points_a, points_b, clean_sheet_a, clean_sheet_b, winner,
    league_points_a, league_points_b, is_processed
"#;

impl Repository {
    /// Persist a generated season schedule in a single transaction.
    ///
    /// The season row is claimed first; if it already exists nothing is
    /// written and `None` is returned. Otherwise returns the number of
    /// fixtures inserted.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn insert_season_schedule(
        &self,
        season: u32,
        start: DateTime<Utc>,
        rounds: &[Round],
    ) -> Result<Option<usize>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            INSERT INTO seasons (season, start_ms, round_count, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(season) DO NOTHING
            "#,
        )
        .bind(season as i64)
        .bind(start.timestamp_millis())
        .bind(rounds.len() as i64)
        .bind(Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let mut total_inserted = 0usize;
        for fixture in rounds.iter().flat_map(Round::fixtures) {
            let result = sqlx::query(
                r#"
                INSERT INTO fixtures (
                    fixture_key, season, round_number, participant_a, participant_b,
                    start_ms, end_ms, is_processed
                ) VALUES (?, ?, ?, ?, ?, ?, ?, 0)
                ON CONFLICT(fixture_key) DO NOTHING
                "#,
            )
            .bind(fixture.key.as_str())
            .bind(fixture.season as i64)
            .bind(fixture.round_number as i64)
            .bind(fixture.participant_a.as_str())
            .bind(fixture.participant_b.as_str())
            .bind(fixture.window.start_ms())
            .bind(fixture.window.end_ms())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                total_inserted += 1;
            }
        }

        tx.commit().await?;
        info!(season, fixtures = total_inserted, "Season schedule stored");
        Ok(Some(total_inserted))
    }

    /// Seasons that have a stored schedule, ascending.
    pub async fn list_seasons(&self) -> Result<Vec<u32>, sqlx::Error> {
        let rows = sqlx::query("SELECT season FROM seasons ORDER BY season ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.get::<i64, _>("season") as u32)
            .collect())
    }

    pub async fn season_exists(&self, season: u32) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM seasons WHERE season = ?")
            .bind(season as i64)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n") > 0)
    }

    /// Query a season's fixtures, optionally for one round and/or only unprocessed ones.
    ///
    /// Ordered by round, then window start, then key.
    pub async fn query_fixtures(
        &self,
        season: u32,
        round_number: Option<u32>,
        only_unprocessed: bool,
    ) -> Result<Vec<Fixture>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {FIXTURE_COLUMNS}
            FROM fixtures
            WHERE season = ?
              AND (? IS NULL OR round_number = ?)
              AND (? = 0 OR is_processed = 0)
            ORDER BY round_number ASC, start_ms ASC, fixture_key ASC
            "#
        );
        let round = round_number.map(|r| r as i64);
        let rows = sqlx::query(&sql)
            .bind(season as i64)
            .bind(round)
            .bind(round)
            .bind(only_unprocessed as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(fixture_from_row).collect()
    }

    /// A season's fixtures involving `participant` on either side, by round.
    pub async fn query_participant_fixtures(
        &self,
        season: u32,
        participant: &Participant,
    ) -> Result<Vec<Fixture>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {FIXTURE_COLUMNS}
            FROM fixtures
            WHERE season = ? AND (participant_a = ? OR participant_b = ?)
            ORDER BY round_number ASC, fixture_key ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(season as i64)
            .bind(participant.as_str())
            .bind(participant.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(fixture_from_row).collect()
    }

    /// Unprocessed fixtures of a season whose window ended strictly before `now`.
    pub async fn query_due_fixtures(
        &self,
        season: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Fixture>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {FIXTURE_COLUMNS}
            FROM fixtures
            WHERE season = ? AND is_processed = 0 AND end_ms < ?
            ORDER BY round_number ASC, start_ms ASC, fixture_key ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(season as i64)
            .bind(now.timestamp_millis())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(fixture_from_row).collect()
    }

    pub async fn query_fixture(&self, fixture_key: &str) -> Result<Option<Fixture>, sqlx::Error> {
        let sql = format!("SELECT {FIXTURE_COLUMNS} FROM fixtures WHERE fixture_key = ?");
        let row = sqlx::query(&sql)
            .bind(fixture_key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(fixture_from_row).transpose()
    }

    /// Write a fixture's result only if it is still unprocessed.
    ///
    /// Returns `false` when the precondition fails (already processed by
    /// another writer, or no such fixture); nothing is changed in that case.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn record_result(
        &self,
        fixture_key: &str,
        result: &FixtureResult,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            r#"
            UPDATE fixtures
            SET points_a = ?, points_b = ?, clean_sheet_a = ?, clean_sheet_b = ?,
                winner = ?, league_points_a = ?, league_points_b = ?,
                is_processed = 1, processed_at = ?
            WHERE fixture_key = ? AND is_processed = 0
            "#,
        )
        .bind(result.points_a.to_canonical_string())
        .bind(result.points_b.to_canonical_string())
        .bind(result.clean_sheet_a as i64)
        .bind(result.clean_sheet_b as i64)
        .bind(result.winner.as_str())
        .bind(result.league_points_a as i64)
        .bind(result.league_points_b as i64)
        .bind(Utc::now().timestamp_millis())
        .bind(fixture_key)
        .execute(&self.pool)
        .await?;

        Ok(updated.rows_affected() == 1)
    }

    /// Round numbers of a season, plus those with unprocessed fixtures.
    pub async fn query_round_numbers(&self, season: u32) -> Result<RoundIndex, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT round_number, MIN(is_processed) AS all_processed
            FROM fixtures
            WHERE season = ?
            GROUP BY round_number
            ORDER BY round_number ASC
            "#,
        )
        .bind(season as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut index = RoundIndex::default();
        for row in rows {
            let round = row.get::<i64, _>("round_number") as u32;
            index.all.push(round);
            if row.get::<i64, _>("all_processed") == 0 {
                index.unprocessed.push(round);
            }
        }
        Ok(index)
    }

    /// The date window of one round, or `None` if the round has no fixtures.
    pub async fn query_round_window(
        &self,
        season: u32,
        round_number: u32,
    ) -> Result<Option<DateWindow>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT start_ms, end_ms
            FROM fixtures
            WHERE season = ? AND round_number = ?
            ORDER BY start_ms ASC
            LIMIT 1
            "#,
        )
        .bind(season as i64)
        .bind(round_number as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let start_ms: i64 = row.get("start_ms");
            let end_ms: i64 = row.get("end_ms");
            DateWindow::from_millis(start_ms, end_ms).ok_or_else(|| {
                decode_error(format!("window out of range: {}..{}", start_ms, end_ms))
            })
        })
        .transpose()
    }

    /// Everyone appearing in a season's fixtures, by name.
    pub async fn query_season_roster(&self, season: u32) -> Result<Vec<Participant>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT participant_a AS name FROM fixtures WHERE season = ?
            UNION
            SELECT participant_b AS name FROM fixtures WHERE season = ?
            ORDER BY name ASC
            "#,
        )
        .bind(season as i64)
        .bind(season as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Participant::new(row.get::<String, _>("name")))
            .collect())
    }
}

fn fixture_from_row(row: &SqliteRow) -> Result<Fixture, sqlx::Error> {
    let key: String = row.get("fixture_key");
    let start_ms: i64 = row.get("start_ms");
    let end_ms: i64 = row.get("end_ms");
    let window = DateWindow::from_millis(start_ms, end_ms).ok_or_else(|| {
        decode_error(format!("fixture {}: window out of range", key))
    })?;

    let state = if row.get::<i64, _>("is_processed") != 0 {
        let winner_str: Option<String> = row.get("winner");
        let winner = winner_str
            .as_deref()
            .map(Winner::from_str)
            .transpose()
            .map_err(|e| decode_error(format!("fixture {}: {}", key, e)))?
            .ok_or_else(|| decode_error(format!("fixture {}: processed without winner", key)))?;

        FixtureState::Processed(FixtureResult {
            points_a: parse_points(&key, "points_a", row.get("points_a"))?,
            points_b: parse_points(&key, "points_b", row.get("points_b"))?,
            clean_sheet_a: row.get::<i64, _>("clean_sheet_a") != 0,
            clean_sheet_b: row.get::<i64, _>("clean_sheet_b") != 0,
            winner,
            league_points_a: league_points(&key, "league_points_a", row.get("league_points_a"))?,
            league_points_b: league_points(&key, "league_points_b", row.get("league_points_b"))?,
        })
    } else {
        FixtureState::Unprocessed
    };

    Ok(Fixture {
        season: row.get::<i64, _>("season") as u32,
        round_number: row.get::<i64, _>("round_number") as u32,
        participant_a: Participant::new(row.get::<String, _>("participant_a")),
        participant_b: Participant::new(row.get::<String, _>("participant_b")),
        window,
        state,
        key,
    })
}

/// A processed fixture must carry readable points; unset is not zero.
fn parse_points(key: &str, column: &str, value: Option<String>) -> Result<Points, sqlx::Error> {
    let s = value.ok_or_else(|| {
        decode_error(format!("fixture {}: processed without {}", key, column))
    })?;
    Points::from_str(&s).map_err(|e| {
        decode_error(format!("fixture {}: {} {:?}: {}", key, column, s, e))
    })
}

fn league_points(key: &str, column: &str, value: Option<i64>) -> Result<u32, sqlx::Error> {
    value
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| decode_error(format!("fixture {}: invalid {}", key, column)))
}
