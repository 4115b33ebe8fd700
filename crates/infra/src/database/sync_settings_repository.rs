//! SQLite implementation of the per-user sync settings store.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_core::SyncSettingsRepository;
use goalpro_domain::{ConflictResolution, Result as DomainResult, SyncSettings};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::instrument;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::{conversion_error, read_optional_timestamp, to_millis};

const SETTINGS_COLUMNS: &str = "user_id, sync_quarterly_targets, sync_monthly_targets,
     sync_weekly_targets, sync_daily_targets, color_assignments, auto_sync_enabled,
     sync_interval_minutes, two_way_sync_enabled, conflict_resolution, last_synced_at";

/// SQLite-backed sync settings, one row per user.
pub struct SqliteSyncSettingsRepository {
    db: Arc<DbManager>,
}

impl SqliteSyncSettingsRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SyncSettingsRepository for SqliteSyncSettingsRepository {
    async fn find(&self, user_id: &str) -> DomainResult<Option<SyncSettings>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<SyncSettings>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!(
                    "SELECT {SETTINGS_COLUMNS} FROM calendar_sync_settings WHERE user_id = ?1"
                ),
                params![user_id],
                map_settings_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self, settings), fields(user_id = %settings.user_id))]
    async fn upsert(&self, settings: &SyncSettings) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let settings = settings.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_settings(&conn, &settings)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record_last_synced(&self, user_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let mut defaults = SyncSettings::defaults_for(user_id);
        defaults.last_synced_at = Some(at);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let existing = conn
                .execute(
                    "UPDATE calendar_sync_settings
                     SET last_synced_at = ?2, updated_at = ?3
                     WHERE user_id = ?1",
                    params![defaults.user_id, to_millis(at), to_millis(Utc::now())],
                )
                .map_err(map_sql_error)?;
            if existing == 0 {
                upsert_settings(&conn, &defaults)?;
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_auto_sync_enabled(&self) -> DomainResult<Vec<SyncSettings>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<SyncSettings>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {SETTINGS_COLUMNS} FROM calendar_sync_settings
                     WHERE auto_sync_enabled = 1
                     ORDER BY user_id"
                ))
                .map_err(map_sql_error)?;
            let rows = stmt.query_map([], map_settings_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL helpers
// ============================================================================

fn upsert_settings(conn: &Connection, settings: &SyncSettings) -> DomainResult<()> {
    let colors = serde_json::to_string(&settings.color_assignments).map_err(|e| {
        goalpro_domain::GoalProError::Internal(format!("failed to encode color assignments: {e}"))
    })?;

    conn.execute(
        "INSERT INTO calendar_sync_settings (
            user_id, sync_quarterly_targets, sync_monthly_targets, sync_weekly_targets,
            sync_daily_targets, color_assignments, auto_sync_enabled, sync_interval_minutes,
            two_way_sync_enabled, conflict_resolution, last_synced_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(user_id) DO UPDATE SET
            sync_quarterly_targets = excluded.sync_quarterly_targets,
            sync_monthly_targets = excluded.sync_monthly_targets,
            sync_weekly_targets = excluded.sync_weekly_targets,
            sync_daily_targets = excluded.sync_daily_targets,
            color_assignments = excluded.color_assignments,
            auto_sync_enabled = excluded.auto_sync_enabled,
            sync_interval_minutes = excluded.sync_interval_minutes,
            two_way_sync_enabled = excluded.two_way_sync_enabled,
            conflict_resolution = excluded.conflict_resolution,
            last_synced_at = excluded.last_synced_at,
            updated_at = excluded.updated_at",
        params![
            settings.user_id,
            settings.sync_quarterly_targets,
            settings.sync_monthly_targets,
            settings.sync_weekly_targets,
            settings.sync_daily_targets,
            colors,
            settings.auto_sync_enabled,
            settings.sync_interval_minutes,
            settings.two_way_sync_enabled,
            settings.conflict_resolution.as_str(),
            settings.last_synced_at.map(to_millis),
            to_millis(Utc::now()),
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn map_settings_row(row: &Row<'_>) -> rusqlite::Result<SyncSettings> {
    let colors: String = row.get(5)?;
    let color_assignments: BTreeMap<String, String> =
        serde_json::from_str(&colors).map_err(|e| conversion_error(5, e))?;
    let resolution: String = row.get(9)?;

    Ok(SyncSettings {
        user_id: row.get(0)?,
        sync_quarterly_targets: row.get(1)?,
        sync_monthly_targets: row.get(2)?,
        sync_weekly_targets: row.get(3)?,
        sync_daily_targets: row.get(4)?,
        color_assignments,
        auto_sync_enabled: row.get(6)?,
        sync_interval_minutes: row.get(7)?,
        two_way_sync_enabled: row.get(8)?,
        conflict_resolution: ConflictResolution::from_str(&resolution)
            .map_err(|e| conversion_error(9, e))?,
        last_synced_at: read_optional_timestamp(row, 10)?,
    })
}
