use matchweek::orchestration::ensure::{ScheduleOutcome, SeasonScheduler};
use matchweek::{
    config::Config, db::init_db, AppError, DataSource, Repository, SqliteDataSource, WeekProcessor,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().map_err(AppError::from)?;

    let pool = init_db(&config.database_path).await.map_err(AppError::from)?;
    let repo = Arc::new(Repository::new(pool.clone()));
    let datasource: Arc<dyn DataSource> = Arc::new(SqliteDataSource::new(pool));

    if let Some(start) = config.season_start {
        if config.roster.is_empty() {
            warn!(season = config.season, "SEASON_START_DATE set without a roster, not scheduling");
        } else {
            let scheduler = SeasonScheduler::new(repo.clone(), config.clone());
            let outcome = scheduler
                .ensure_season_scheduled(config.season, start, &config.roster)
                .await
                .map_err(AppError::from)?;
            if let ScheduleOutcome::Scheduled { start, rounds, fixtures } = outcome {
                info!(season = config.season, %start, rounds, fixtures, "Created schedule");
            }
        }
    }

    let processor = WeekProcessor::new(datasource, repo.clone(), config.clone());
    let report = processor
        .process_round(config.season, config.round)
        .await
        .map_err(AppError::from)?;

    for summary in &report.processed {
        info!(
            round = summary.round_number,
            a = %summary.participant_a,
            b = %summary.participant_b,
            points_a = %summary.points_a,
            points_b = %summary.points_b,
            winner = %summary.winner,
            "Fixture scored"
        );
    }
    for skipped in &report.skipped {
        warn!(fixture = %skipped.fixture_key, reason = ?skipped.reason, "Fixture skipped");
    }

    let standings = processor
        .standings(config.season)
        .await
        .map_err(AppError::from)?;
    println!("{}", serde_json::to_string_pretty(&standings)?);

    if let Some(participant) = &config.fixtures_for {
        let fixtures = repo
            .query_participant_fixtures(config.season, participant)
            .await
            .map_err(AppError::from)?;
        info!(participant = %participant, fixtures = fixtures.len(), "Participant fixtures");
        println!("{}", serde_json::to_string_pretty(&fixtures)?);
    }

    Ok(())
}
