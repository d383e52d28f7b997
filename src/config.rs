use crate::domain::{Participant, Points};
use crate::schedule::ByePolicy;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub season: u32,
    /// Round to process; `None` processes every fixture whose window has elapsed.
    pub round: Option<u32>,
    pub clean_sheet_bonus: Points,
    pub bye_policy: ByePolicy,
    pub align_to_week_start: bool,
    /// Start of round 1 when the season still needs a schedule.
    pub season_start: Option<DateTime<Utc>>,
    pub roster: Vec<Participant>,
    /// Print this participant's fixtures after processing.
    pub fixtures_for: Option<Participant>,
    pub process_concurrency: usize,
    pub io_timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let season = env_map
            .get("SEASON")
            .map(|s| s.as_str())
            .unwrap_or("1")
            .parse::<u32>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SEASON".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let round = match env_map.get("ROUND").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse::<u32>().ok().filter(|r| *r > 0).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "ROUND".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?),
            None => None,
        };

        let clean_sheet_bonus = Points::from_str_canonical(
            env_map
                .get("CLEAN_SHEET_BONUS")
                .map(|s| s.as_str())
                .unwrap_or("-1"),
        )
        .map_err(|_| {
            ConfigError::InvalidValue(
                "CLEAN_SHEET_BONUS".to_string(),
                "must be a decimal number".to_string(),
            )
        })?;

        let bye_policy = match env_map
            .get("BYE_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("reject")
        {
            "reject" => ByePolicy::Reject,
            "allow" => ByePolicy::Allow,
            other => {
                return Err(ConfigError::InvalidValue(
                    "BYE_POLICY".to_string(),
                    format!("must be reject or allow, got {}", other),
                ))
            }
        };

        let align_to_week_start = match env_map
            .get("ALIGN_TO_WEEK_START")
            .map(|s| s.as_str())
            .unwrap_or("false")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ALIGN_TO_WEEK_START".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let season_start = match env_map.get("SEASON_START_DATE") {
            Some(s) => Some(
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(|d| d.and_time(NaiveTime::MIN).and_utc())
                    .map_err(|_| {
                        ConfigError::InvalidValue(
                            "SEASON_START_DATE".to_string(),
                            "must be YYYY-MM-DD".to_string(),
                        )
                    })?,
            ),
            None => None,
        };

        let process_concurrency = env_map
            .get("PROCESS_CONCURRENCY")
            .map(|s| s.as_str())
            .unwrap_or("4")
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "PROCESS_CONCURRENCY".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let io_timeout_ms = env_map
            .get("IO_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("30000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "IO_TIMEOUT_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let roster = parse_roster_from_map(&env_map)?;

        let fixtures_for = env_map
            .get("FIXTURES_FOR")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Participant::new);

        Ok(Config {
            database_path,
            season,
            round,
            clean_sheet_bonus,
            bye_policy,
            align_to_week_start,
            season_start,
            roster,
            fixtures_for,
            process_concurrency,
            io_timeout_ms,
        })
    }
}

fn parse_roster_from_map(
    env_map: &HashMap<String, String>,
) -> Result<Vec<Participant>, ConfigError> {
    let names: Vec<String> = if let Some(roster_str) = env_map.get("ROSTER") {
        roster_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else if let Some(file_path) = env_map.get("ROSTER_FILE") {
        let content = std::fs::read_to_string(file_path).map_err(|_| {
            ConfigError::InvalidValue(
                "ROSTER_FILE".to_string(),
                "file not found or unreadable".to_string(),
            )
        })?;
        content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        Vec::new()
    };

    Ok(names.into_iter().map(Participant::new).collect())
}
