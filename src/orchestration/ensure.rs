use crate::config::Config;
use crate::db::Repository;
use crate::domain::{align_to_week_start, Participant};
use crate::schedule::{check, generate, validate, ScheduleError, ValidationReport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Creates a season's schedule at most once.
#[derive(Clone)]
pub struct SeasonScheduler {
    repo: Arc<Repository>,
    config: Config,
}

impl SeasonScheduler {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }

    /// Ensure `season` has a stored schedule for `roster`.
    ///
    /// Generates, self-validates and persists the double round-robin unless the
    /// season already exists. With `align_to_week_start` configured, round 1
    /// begins on the Monday on or before `start`.
    pub async fn ensure_season_scheduled(
        &self,
        season: u32,
        start: DateTime<Utc>,
        roster: &[Participant],
    ) -> Result<ScheduleOutcome, SchedulingError> {
        if self.repo.season_exists(season).await? {
            info!(season, "Season already scheduled");
            return Ok(ScheduleOutcome::AlreadyScheduled);
        }

        let start = if self.config.align_to_week_start {
            align_to_week_start(start)
        } else {
            start
        };

        let rounds = generate(start, roster, season, self.config.bye_policy)?;
        if !validate(&rounds, roster) {
            return Err(SchedulingError::InvalidSchedule(check(&rounds, roster)));
        }

        match self
            .repo
            .insert_season_schedule(season, start, &rounds)
            .await?
        {
            Some(fixtures) => {
                info!(
                    season,
                    rounds = rounds.len(),
                    fixtures,
                    start = %start,
                    "Season scheduled"
                );
                Ok(ScheduleOutcome::Scheduled {
                    start,
                    rounds: rounds.len(),
                    fixtures,
                })
            }
            None => Ok(ScheduleOutcome::AlreadyScheduled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled {
        start: DateTime<Utc>,
        rounds: usize,
        fixtures: usize,
    },
    AlreadyScheduled,
}

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("generated schedule failed validation with {} violation(s)", .0.violations.len())]
    InvalidSchedule(ValidationReport),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use crate::domain::Points;
    use crate::schedule::ByePolicy;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn setup_repo() -> (Arc<Repository>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Arc::new(Repository::new(pool)), temp_dir)
    }

    fn test_config(bye_policy: ByePolicy, align_to_week_start: bool) -> Config {
        Config {
            database_path: ":memory:".to_string(),
            season: 1,
            round: None,
            clean_sheet_bonus: Points::from(-1),
            bye_policy,
            align_to_week_start,
            season_start: None,
            roster: vec![],
            fixtures_for: None,
            process_concurrency: 4,
            io_timeout_ms: 1000,
        }
    }

    fn roster(names: &[&str]) -> Vec<Participant> {
        names.iter().map(|n| Participant::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_schedules_season_once() {
        let (repo, _temp) = setup_repo().await;
        let scheduler = SeasonScheduler::new(repo.clone(), test_config(ByePolicy::Reject, false));
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let players = roster(&["A", "B", "C", "D"]);

        let first = scheduler
            .ensure_season_scheduled(1, start, &players)
            .await
            .unwrap();
        assert_eq!(
            first,
            ScheduleOutcome::Scheduled {
                start,
                rounds: 6,
                fixtures: 12
            }
        );

        let second = scheduler
            .ensure_season_scheduled(1, start, &players)
            .await
            .unwrap();
        assert_eq!(second, ScheduleOutcome::AlreadyScheduled);
        assert_eq!(repo.query_fixtures(1, None, false).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_aligns_start_to_monday() {
        let (repo, _temp) = setup_repo().await;
        let scheduler = SeasonScheduler::new(repo.clone(), test_config(ByePolicy::Reject, true));
        let wednesday = Utc.with_ymd_and_hms(2024, 1, 3, 18, 30, 0).unwrap();

        let outcome = scheduler
            .ensure_season_scheduled(2, wednesday, &roster(&["A", "B"]))
            .await
            .unwrap();
        let monday = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(outcome, ScheduleOutcome::Scheduled { start, .. } if start == monday));

        let window = repo.query_round_window(2, 1).await.unwrap().unwrap();
        assert_eq!(window.start, monday);
    }

    #[tokio::test]
    async fn test_odd_roster_error_leaves_season_unclaimed() {
        let (repo, _temp) = setup_repo().await;
        let scheduler = SeasonScheduler::new(repo.clone(), test_config(ByePolicy::Reject, false));
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let err = scheduler
            .ensure_season_scheduled(1, start, &roster(&["A", "B", "C"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Schedule(ScheduleError::OddRosterRequiresExplicitBye { count: 3 })
        ));
        assert!(!repo.season_exists(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_odd_roster_allowed_with_byes() {
        let (repo, _temp) = setup_repo().await;
        let scheduler = SeasonScheduler::new(repo.clone(), test_config(ByePolicy::Allow, false));
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let outcome = scheduler
            .ensure_season_scheduled(1, start, &roster(&["A", "B", "C", "D", "E"]))
            .await
            .unwrap();
        // 10 rounds of 2 fixtures each; the bye slot is never stored.
        assert!(matches!(
            outcome,
            ScheduleOutcome::Scheduled { rounds: 10, fixtures: 20, .. }
        ));
    }
}
