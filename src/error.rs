use crate::config::ConfigError;
use crate::orchestration::ensure::SchedulingError;
use crate::orchestration::ProcessingError;
use thiserror::Error;

/// Top-level error for the `matchweek` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),
    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),
}
