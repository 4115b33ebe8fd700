//! SQLite implementation of the sync-state ledger.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_core::SyncRecordRepository;
use goalpro_domain::constants::TIME_BLOCK_ENTITY;
use goalpro_domain::{Result as DomainResult, SyncLedgerSummary, SyncRecord, SyncStatus};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::{conversion_error, read_timestamp, to_millis};

const RECORD_COLUMNS: &str =
    "id, user_id, event_id, local_entity_id, local_entity_type, sync_status, last_synced_at";

/// SQLite-backed ledger linking local entities to Google events.
pub struct SqliteSyncRecordRepository {
    db: Arc<DbManager>,
}

impl SqliteSyncRecordRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SyncRecordRepository for SqliteSyncRecordRepository {
    async fn list_for_user(
        &self,
        user_id: &str,
        entity_type: &str,
    ) -> DomainResult<Vec<SyncRecord>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let entity_type = entity_type.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<SyncRecord>> {
            let conn = db.get_connection()?;
            query_records(&conn, &user_id, &entity_type).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_local_entity(
        &self,
        user_id: &str,
        entity_type: &str,
        local_entity_id: &str,
    ) -> DomainResult<Option<SyncRecord>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let entity_type = entity_type.to_string();
        let local_entity_id = local_entity_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<SyncRecord>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM calendar_sync_records
                     WHERE user_id = ?1 AND local_entity_type = ?2 AND local_entity_id = ?3
                     ORDER BY last_synced_at DESC
                     LIMIT 1"
                ),
                params![user_id, entity_type, local_entity_id],
                map_record_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn upsert(&self, record: &SyncRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_record(&conn, &record).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_status(
        &self,
        record_id: &str,
        status: SyncStatus,
        synced_at: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let record_id = record_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "UPDATE calendar_sync_records
                 SET sync_status = ?2, last_synced_at = COALESCE(?3, last_synced_at)
                 WHERE id = ?1",
                params![record_id, status.as_str(), synced_at.map(to_millis)],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_needs_check(&self, user_id: &str) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<u64> {
            let conn = db.get_connection()?;
            let marked = conn
                .execute(
                    "UPDATE calendar_sync_records SET sync_status = ?3
                     WHERE user_id = ?1 AND sync_status = ?2",
                    params![user_id, SyncStatus::Synced.as_str(), SyncStatus::NeedsCheck.as_str()],
                )
                .map_err(map_sql_error)?;
            Ok(marked as u64)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn summary(&self, user_id: &str) -> DomainResult<SyncLedgerSummary> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<SyncLedgerSummary> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN sync_status = ?3 THEN 1 ELSE 0 END), 0)
                 FROM calendar_sync_records
                 WHERE user_id = ?1 AND local_entity_type = ?2",
                params![user_id, TIME_BLOCK_ENTITY, SyncStatus::NeedsCheck.as_str()],
                |row| {
                    Ok(SyncLedgerSummary {
                        linked_time_blocks: row.get::<_, i64>(0)?.unsigned_abs(),
                        records_needing_check: row.get::<_, i64>(1)?.unsigned_abs(),
                    })
                },
            )
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL helpers
// ============================================================================

fn query_records(
    conn: &Connection,
    user_id: &str,
    entity_type: &str,
) -> rusqlite::Result<Vec<SyncRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM calendar_sync_records
         WHERE user_id = ?1 AND local_entity_type = ?2
         ORDER BY last_synced_at ASC"
    ))?;
    let rows = stmt.query_map(params![user_id, entity_type], map_record_row)?;
    rows.collect()
}

fn upsert_record(conn: &Connection, record: &SyncRecord) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO calendar_sync_records (
            id, user_id, event_id, local_entity_id, local_entity_type, sync_status, last_synced_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(user_id, event_id) DO UPDATE SET
            local_entity_id = excluded.local_entity_id,
            local_entity_type = excluded.local_entity_type,
            sync_status = excluded.sync_status,
            last_synced_at = excluded.last_synced_at",
        params![
            record.id,
            record.user_id,
            record.event_id,
            record.local_entity_id,
            record.local_entity_type,
            record.sync_status.as_str(),
            to_millis(record.last_synced_at),
        ],
    )?;
    Ok(())
}

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<SyncRecord> {
    let status: String = row.get(5)?;
    Ok(SyncRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        event_id: row.get(2)?,
        local_entity_id: row.get(3)?,
        local_entity_type: row.get(4)?,
        sync_status: SyncStatus::from_str(&status).map_err(|e| conversion_error(5, e))?,
        last_synced_at: read_timestamp(row, 6)?,
    })
}
