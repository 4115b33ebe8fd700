//! Per-user calendar sync settings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SYNC_INTERVAL_MINUTES, MAX_SYNC_INTERVAL_MINUTES, MIN_SYNC_INTERVAL_MINUTES,
};
use crate::errors::{GoalProError, Result};

/// Conflict-resolution label chosen by the user.
///
/// Stored and reported, not applied by the sync executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    #[default]
    AppWins,
    GoogleWins,
    Manual,
}

impl ConflictResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppWins => "app_wins",
            Self::GoogleWins => "google_wins",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictResolution {
    type Err = GoalProError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "app_wins" => Ok(Self::AppWins),
            "google_wins" => Ok(Self::GoogleWins),
            "manual" => Ok(Self::Manual),
            other => {
                Err(GoalProError::InvalidInput(format!("unknown conflict resolution: {other}")))
            }
        }
    }
}

/// Calendar sync settings, one row per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub user_id: String,
    pub sync_quarterly_targets: bool,
    pub sync_monthly_targets: bool,
    pub sync_weekly_targets: bool,
    pub sync_daily_targets: bool,
    pub color_assignments: BTreeMap<String, String>,
    pub auto_sync_enabled: bool,
    pub sync_interval_minutes: u32,
    pub two_way_sync_enabled: bool,
    pub conflict_resolution: ConflictResolution,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl SyncSettings {
    /// Settings returned for a user that has never saved any.
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            sync_quarterly_targets: true,
            sync_monthly_targets: true,
            sync_weekly_targets: true,
            sync_daily_targets: true,
            color_assignments: BTreeMap::new(),
            auto_sync_enabled: false,
            sync_interval_minutes: DEFAULT_SYNC_INTERVAL_MINUTES,
            two_way_sync_enabled: false,
            conflict_resolution: ConflictResolution::AppWins,
            last_synced_at: None,
        }
    }

    /// Whether an automatic sync is due at `now`.
    pub fn auto_sync_due(&self, now: DateTime<Utc>) -> bool {
        if !self.auto_sync_enabled {
            return false;
        }
        self.last_synced_at.is_none_or(|last| {
            now - last >= chrono::Duration::minutes(i64::from(self.sync_interval_minutes))
        })
    }
}

/// Partial settings update. Absent keys leave stored values untouched.
///
/// Keys are accepted in snake_case and camelCase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncSettingsPatch {
    #[serde(default, alias = "syncQuarterlyTargets")]
    pub sync_quarterly_targets: Option<bool>,
    #[serde(default, alias = "syncMonthlyTargets")]
    pub sync_monthly_targets: Option<bool>,
    #[serde(default, alias = "syncWeeklyTargets")]
    pub sync_weekly_targets: Option<bool>,
    #[serde(default, alias = "syncDailyTargets")]
    pub sync_daily_targets: Option<bool>,
    #[serde(default, alias = "colorAssignments")]
    pub color_assignments: Option<BTreeMap<String, String>>,
    #[serde(default, alias = "autoSyncEnabled")]
    pub auto_sync_enabled: Option<bool>,
    #[serde(default, alias = "syncIntervalMinutes")]
    pub sync_interval_minutes: Option<u32>,
    #[serde(default, alias = "twoWaySyncEnabled")]
    pub two_way_sync_enabled: Option<bool>,
    #[serde(default, alias = "conflictResolution")]
    pub conflict_resolution: Option<ConflictResolution>,
}

impl SyncSettingsPatch {
    /// Reject values the settings row cannot hold.
    pub fn validate(&self) -> Result<()> {
        if let Some(minutes) = self.sync_interval_minutes {
            if !(MIN_SYNC_INTERVAL_MINUTES..=MAX_SYNC_INTERVAL_MINUTES).contains(&minutes) {
                return Err(GoalProError::InvalidInput(format!(
                    "sync_interval_minutes must be between {} and {}",
                    MIN_SYNC_INTERVAL_MINUTES, MAX_SYNC_INTERVAL_MINUTES
                )));
            }
        }
        Ok(())
    }

    /// Overlay present keys onto `settings`.
    pub fn apply_to(self, settings: &mut SyncSettings) {
        let Self {
            sync_quarterly_targets,
            sync_monthly_targets,
            sync_weekly_targets,
            sync_daily_targets,
            color_assignments,
            auto_sync_enabled,
            sync_interval_minutes,
            two_way_sync_enabled,
            conflict_resolution,
        } = self;

        if let Some(value) = sync_quarterly_targets {
            settings.sync_quarterly_targets = value;
        }
        if let Some(value) = sync_monthly_targets {
            settings.sync_monthly_targets = value;
        }
        if let Some(value) = sync_weekly_targets {
            settings.sync_weekly_targets = value;
        }
        if let Some(value) = sync_daily_targets {
            settings.sync_daily_targets = value;
        }
        if let Some(value) = color_assignments {
            settings.color_assignments = value;
        }
        if let Some(value) = auto_sync_enabled {
            settings.auto_sync_enabled = value;
        }
        if let Some(value) = sync_interval_minutes {
            settings.sync_interval_minutes = value;
        }
        if let Some(value) = two_way_sync_enabled {
            settings.two_way_sync_enabled = value;
        }
        if let Some(value) = conflict_resolution {
            settings.conflict_resolution = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_serialize_to_the_documented_object() {
        let value = serde_json::to_value(SyncSettings::defaults_for("user-1")).unwrap();
        assert_eq!(value["sync_quarterly_targets"], json!(true));
        assert_eq!(value["sync_daily_targets"], json!(true));
        assert_eq!(value["auto_sync_enabled"], json!(false));
        assert_eq!(value["two_way_sync_enabled"], json!(false));
        assert_eq!(value["sync_interval_minutes"], json!(15));
        assert_eq!(value["conflict_resolution"], json!("app_wins"));
        assert_eq!(value["last_synced_at"], json!(null));
    }

    #[test]
    fn patch_accepts_camel_case_keys() {
        let patch: SyncSettingsPatch =
            serde_json::from_value(json!({"autoSyncEnabled": true})).unwrap();
        assert_eq!(patch.auto_sync_enabled, Some(true));
        assert_eq!(patch.two_way_sync_enabled, None);
    }

    #[test]
    fn patch_only_overwrites_present_keys() {
        let mut settings = SyncSettings::defaults_for("user-1");
        settings.two_way_sync_enabled = true;
        settings.conflict_resolution = ConflictResolution::Manual;

        let patch = SyncSettingsPatch { auto_sync_enabled: Some(true), ..Default::default() };
        patch.apply_to(&mut settings);

        assert!(settings.auto_sync_enabled);
        assert!(settings.two_way_sync_enabled);
        assert_eq!(settings.conflict_resolution, ConflictResolution::Manual);
    }

    #[test]
    fn unknown_conflict_label_is_rejected() {
        let parsed: std::result::Result<SyncSettingsPatch, _> =
            serde_json::from_value(json!({"conflict_resolution": "last_write_wins"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn interval_outside_bounds_fails_validation() {
        let patch = SyncSettingsPatch { sync_interval_minutes: Some(1), ..Default::default() };
        assert!(matches!(patch.validate(), Err(GoalProError::InvalidInput(_))));

        let patch = SyncSettingsPatch { sync_interval_minutes: Some(30), ..Default::default() };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn auto_sync_due_respects_interval() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut settings = SyncSettings::defaults_for("user-1");
        assert!(!settings.auto_sync_due(now));

        settings.auto_sync_enabled = true;
        assert!(settings.auto_sync_due(now));

        settings.last_synced_at = Some(now - chrono::Duration::minutes(10));
        assert!(!settings.auto_sync_due(now));

        settings.last_synced_at = Some(now - chrono::Duration::minutes(15));
        assert!(settings.auto_sync_due(now));
    }
}
