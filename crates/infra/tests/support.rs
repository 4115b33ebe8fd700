#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use goalpro_domain::{SyncRecord, SyncStatus, TimeBlock};
use goalpro_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary database with migrations applied. The directory lives as long
/// as the wrapper.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("goalpro-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Count rows in `table` matching a raw `WHERE` clause.
    pub fn count(&self, table: &str, clause: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table} WHERE {clause}"), [], |row| {
            row.get(0)
        })
        .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-second timestamps survive the millisecond round trip unchanged.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
}

pub fn time_block(user_id: &str, id: &str, updated_at: DateTime<Utc>) -> TimeBlock {
    TimeBlock {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: format!("Block {id}"),
        description: None,
        start_time: at(9, 0),
        end_time: at(10, 0),
        google_event_id: None,
        updated_at,
    }
}

pub fn sync_record(
    user_id: &str,
    event_id: &str,
    block_id: &str,
    status: SyncStatus,
) -> SyncRecord {
    SyncRecord {
        id: format!("rec-{event_id}"),
        user_id: user_id.to_string(),
        event_id: event_id.to_string(),
        local_entity_id: block_id.to_string(),
        local_entity_type: "time_block".to_string(),
        sync_status: status,
        last_synced_at: at(8, 0),
    }
}
