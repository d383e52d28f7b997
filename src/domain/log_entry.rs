//! Consumption log entries supplied by the log store.

use crate::domain::Points;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dated, point-valued consumption event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub participant_id: i64,
    pub logged_at: DateTime<Utc>,
    /// Points charged for this entry.
    pub points: Points,
    /// True when the logged item's catalog base value is positive.
    pub is_harmful: bool,
}

impl LogEntry {
    pub fn new(
        participant_id: i64,
        logged_at: DateTime<Utc>,
        points: Points,
        is_harmful: bool,
    ) -> Self {
        LogEntry {
            participant_id,
            logged_at,
            points,
            is_harmful,
        }
    }
}
