//! Round processing: aggregate logs per fixture window and score.

use crate::config::Config;
use crate::datasource::{DataSource, DataSourceError};
use crate::db::Repository;
use crate::domain::{DateWindow, Fixture, LogEntry, Participant, ParticipantRecord, Points, Winner};
use crate::engine::{compute_standings, score_tallies, CleanSheetRule, ScoringError, Standing};
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Scores due fixtures from external log data.
#[derive(Clone)]
pub struct WeekProcessor {
    datasource: Arc<dyn DataSource>,
    repo: Arc<Repository>,
    config: Config,
}

impl WeekProcessor {
    pub fn new(datasource: Arc<dyn DataSource>, repo: Arc<Repository>, config: Config) -> Self {
        Self {
            datasource,
            repo,
            config,
        }
    }

    /// Process one round of `season`, or every elapsed unprocessed fixture when
    /// `round` is `None`, using the configured clean-sheet bonus.
    pub async fn process_round(
        &self,
        season: u32,
        round: Option<u32>,
    ) -> Result<RoundReport, ProcessingError> {
        let rule = CleanSheetRule::new(self.config.clean_sheet_bonus);
        self.process_round_at(season, round, Utc::now(), &rule).await
    }

    /// Like [`process_round`](Self::process_round) with an explicit clock and rule.
    ///
    /// With a round number, all of that round's unprocessed fixtures are
    /// candidates. Without one, candidates are unprocessed fixtures whose
    /// window ended strictly before `now`. Fixtures run concurrently; a
    /// failure is recorded against its fixture and never aborts the rest.
    ///
    /// # Errors
    /// Returns an error only if the candidate fixtures cannot be loaded.
    pub async fn process_round_at(
        &self,
        season: u32,
        round: Option<u32>,
        now: DateTime<Utc>,
        rule: &CleanSheetRule,
    ) -> Result<RoundReport, ProcessingError> {
        let candidates = match round {
            Some(round_number) => {
                self.repo
                    .query_fixtures(season, Some(round_number), true)
                    .await?
            }
            None => self.repo.query_due_fixtures(season, now).await?,
        };

        info!(
            season,
            round = ?round,
            candidates = candidates.len(),
            bonus = %rule.bonus,
            "Processing fixtures"
        );

        let outcomes: Vec<Result<ProcessedFixtureSummary, SkippedFixture>> =
            stream::iter(candidates)
                .map(|fixture| self.process_fixture(fixture, rule))
                .buffer_unordered(self.config.process_concurrency.max(1))
                .collect()
                .await;

        let mut report = RoundReport {
            season,
            round,
            processed: Vec::new(),
            skipped: Vec::new(),
        };
        for outcome in outcomes {
            match outcome {
                Ok(summary) => report.processed.push(summary),
                Err(skipped) => report.skipped.push(skipped),
            }
        }
        report
            .processed
            .sort_by_key(|s| (s.round_number, s.fixture_key.clone()));
        report
            .skipped
            .sort_by_key(|s| (s.round_number, s.fixture_key.clone()));

        info!(
            season,
            processed = report.processed.len(),
            skipped = report.skipped.len(),
            "Processing finished"
        );
        Ok(report)
    }

    /// League table for a season from its stored fixtures.
    pub async fn standings(&self, season: u32) -> Result<Vec<Standing>, ProcessingError> {
        let roster = self.repo.query_season_roster(season).await?;
        let fixtures = self.repo.query_fixtures(season, None, false).await?;
        Ok(compute_standings(&roster, &fixtures))
    }

    async fn process_fixture(
        &self,
        mut fixture: Fixture,
        rule: &CleanSheetRule,
    ) -> Result<ProcessedFixtureSummary, SkippedFixture> {
        let fixture_key = fixture.key.clone();
        let round_number = fixture.round_number;
        let skip = |reason: SkipReason| SkippedFixture {
            fixture_key: fixture_key.clone(),
            round_number,
            reason,
        };

        let (record_a, record_b) = tokio::try_join!(
            self.resolve(&fixture.participant_a),
            self.resolve(&fixture.participant_b)
        )
        .map_err(|e| {
            warn!(fixture = %fixture_key, error = %e, "Participant lookup failed");
            skip(SkipReason::SourceFailed(e.to_string()))
        })?;

        let (record_a, record_b) = match (record_a, record_b) {
            (Some(a), Some(b)) => (a, b),
            (a, _) => {
                let missing = if a.is_none() {
                    fixture.participant_a.clone()
                } else {
                    fixture.participant_b.clone()
                };
                warn!(
                    fixture = %fixture.key,
                    participant = %missing,
                    "Unknown participant, skipping fixture"
                );
                return Err(skip(SkipReason::UnknownParticipant(missing)));
            }
        };

        let window = fixture.window;
        let (logs_a, logs_b) = tokio::try_join!(
            self.fetch_logs(&record_a, &window),
            self.fetch_logs(&record_b, &window)
        )
        .map_err(|e| {
            warn!(fixture = %fixture_key, error = %e, "Log fetch failed");
            skip(SkipReason::SourceFailed(e.to_string()))
        })?;

        let tally_a = rule.tally(&logs_a);
        let tally_b = rule.tally(&logs_b);
        debug!(
            fixture = %fixture.key,
            raw_a = %tally_a.raw,
            raw_b = %tally_b.raw,
            total_a = %tally_a.total,
            total_b = %tally_b.total,
            "Tallied fixture"
        );

        let result = score_tallies(&mut fixture, &tally_a, &tally_b).map_err(|e| match e {
            ScoringError::AlreadyProcessed(_) => skip(SkipReason::AlreadyProcessed),
        })?;

        match self.repo.record_result(&fixture.key, &result).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    fixture = %fixture.key,
                    "Fixture was processed concurrently, result discarded"
                );
                return Err(skip(SkipReason::AlreadyProcessed));
            }
            Err(e) => {
                warn!(fixture = %fixture.key, error = %e, "Failed to store fixture result");
                return Err(skip(SkipReason::StoreFailed(e.to_string())));
            }
        }

        Ok(ProcessedFixtureSummary {
            winning_participant: fixture.winning_participant().cloned(),
            fixture_key: fixture.key,
            season: fixture.season,
            round_number: fixture.round_number,
            participant_a: fixture.participant_a,
            participant_b: fixture.participant_b,
            raw_points_a: tally_a.raw,
            raw_points_b: tally_b.raw,
            points_a: result.points_a,
            points_b: result.points_b,
            clean_sheet_a: result.clean_sheet_a,
            clean_sheet_b: result.clean_sheet_b,
            winner: result.winner,
            league_points_a: result.league_points_a,
            league_points_b: result.league_points_b,
        })
    }

    async fn resolve(
        &self,
        participant: &Participant,
    ) -> Result<Option<ParticipantRecord>, DataSourceError> {
        self.with_retry(|| self.datasource.resolve_participant(participant))
            .await
    }

    async fn fetch_logs(
        &self,
        record: &ParticipantRecord,
        window: &DateWindow,
    ) -> Result<Vec<LogEntry>, DataSourceError> {
        self.with_retry(|| self.datasource.fetch_logs(record.id, window))
            .await
    }

    /// Retry transient source errors with exponential backoff, bounded by the
    /// configured I/O deadline.
    async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T, DataSourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DataSourceError>>,
    {
        let deadline = Duration::from_millis(self.config.io_timeout_ms);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(deadline),
            ..Default::default()
        };

        let attempt = retry(backoff, || {
            let fut = op();
            async move {
                fut.await.map_err(|e| {
                    if e.is_transient() {
                        debug!(error = %e, "Transient source error, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        });

        tokio::time::timeout(deadline, attempt)
            .await
            .map_err(|_| {
                DataSourceError::Unavailable(format!("timed out after {}ms", deadline.as_millis()))
            })?
    }
}

/// Outcome of one processed fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFixtureSummary {
    pub fixture_key: String,
    pub season: u32,
    pub round_number: u32,
    pub participant_a: Participant,
    pub participant_b: Participant,
    /// Logged points before any clean-sheet bonus.
    pub raw_points_a: Points,
    pub raw_points_b: Points,
    pub points_a: Points,
    pub points_b: Points,
    pub clean_sheet_a: bool,
    pub clean_sheet_b: bool,
    pub winner: Winner,
    /// `None` on a draw.
    pub winning_participant: Option<Participant>,
    pub league_points_a: u32,
    pub league_points_b: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum SkipReason {
    /// Identity could not be resolved; the roster is partially onboarded.
    UnknownParticipant(Participant),
    /// Another writer scored the fixture first.
    AlreadyProcessed,
    SourceFailed(String),
    StoreFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFixture {
    pub fixture_key: String,
    pub round_number: u32,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub season: u32,
    pub round: Option<u32>,
    pub processed: Vec<ProcessedFixtureSummary>,
    pub skipped: Vec<SkippedFixture>,
}

impl RoundReport {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
