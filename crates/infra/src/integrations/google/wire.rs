//! Google JSON payloads.

use chrono::{DateTime, NaiveDate, Utc};
use goalpro_domain::{EventDraft, GoalProError, RemoteEvent, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEvent {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<EventDateTime>,
    #[serde(default)]
    pub end: Option<EventDateTime>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl EventDateTime {
    fn instant(&self) -> Option<DateTime<Utc>> {
        self.date_time.or_else(|| {
            self.date.and_then(|day| day.and_hms_opt(0, 0, 0)).map(|naive| naive.and_utc())
        })
    }
}

impl GoogleEvent {
    pub fn into_remote(self) -> Result<RemoteEvent> {
        let cancelled = self.status.as_deref() == Some("cancelled");
        let start = self.start.as_ref().and_then(EventDateTime::instant);
        let end = self.end.as_ref().and_then(EventDateTime::instant);

        // Cancelled events may come back without times.
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            _ if cancelled => (self.updated, self.updated),
            _ => {
                return Err(GoalProError::Network(format!(
                    "Google event {} has no start or end time",
                    self.id
                )))
            }
        };

        Ok(RemoteEvent {
            id: self.id,
            summary: self.summary,
            description: self.description,
            start,
            end,
            updated: self.updated,
            cancelled,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventBody<'a> {
    pub summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<&'a str>,
}

impl<'a> From<&'a EventDraft> for EventBody<'a> {
    fn from(draft: &'a EventDraft) -> Self {
        Self {
            summary: &draft.summary,
            description: draft.description.as_deref(),
            start: EventDateTime { date_time: Some(draft.start), date: None },
            end: EventDateTime { date_time: Some(draft.end), date: None },
            color_id: draft.color_id.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WatchBody<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub address: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WatchAck {
    pub resource_id: String,
    /// Milliseconds since the epoch, encoded as a string.
    #[serde(default)]
    pub expiration: Option<String>,
}

impl WatchAck {
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StopBody<'a> {
    pub id: &'a str,
    pub resource_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfo {
    #[serde(default)]
    pub email: Option<String>,
}
