//! Local schedule entries reconciled against the remote calendar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{GoalProError, Result};

/// A scheduled block of time owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub google_event_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a time block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeBlock {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl NewTimeBlock {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(GoalProError::InvalidInput("title must not be empty".into()));
        }
        if self.end_time <= self.start_time {
            return Err(GoalProError::InvalidInput("endTime must be after startTime".into()));
        }
        Ok(())
    }
}
