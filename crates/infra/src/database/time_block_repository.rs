//! SQLite implementation of the TimeBlockRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use goalpro_core::TimeBlockRepository;
use goalpro_domain::{GoalProError, Result as DomainResult, TimeBlock};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::{read_timestamp, to_millis};

const BLOCK_COLUMNS: &str =
    "id, user_id, title, description, start_time, end_time, google_event_id, updated_at";

/// SQLite-backed time block storage, scoped by owner.
pub struct SqliteTimeBlockRepository {
    db: Arc<DbManager>,
}

impl SqliteTimeBlockRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimeBlockRepository for SqliteTimeBlockRepository {
    async fn find(&self, user_id: &str, id: &str) -> DomainResult<Option<TimeBlock>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<TimeBlock>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("SELECT {BLOCK_COLUMNS} FROM time_blocks WHERE user_id = ?1 AND id = ?2"),
                params![user_id, id],
                map_block_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<TimeBlock>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<TimeBlock>> {
            let conn = db.get_connection()?;
            query_blocks(&conn, &user_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, block: &TimeBlock) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let block = block.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                &format!(
                    "INSERT INTO time_blocks ({BLOCK_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    block.id,
                    block.user_id,
                    block.title,
                    block.description,
                    to_millis(block.start_time),
                    to_millis(block.end_time),
                    block.google_event_id,
                    to_millis(block.updated_at),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update(&self, block: &TimeBlock) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let block = block.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE time_blocks
                     SET title = ?3, description = ?4, start_time = ?5, end_time = ?6,
                         google_event_id = ?7, updated_at = ?8
                     WHERE user_id = ?1 AND id = ?2",
                    params![
                        block.user_id,
                        block.id,
                        block.title,
                        block.description,
                        to_millis(block.start_time),
                        to_millis(block.end_time),
                        block.google_event_id,
                        to_millis(block.updated_at),
                    ],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(GoalProError::NotFound(format!("time block {}", block.id)));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete(&self, user_id: &str, id: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let removed = conn
                .execute(
                    "DELETE FROM time_blocks WHERE user_id = ?1 AND id = ?2",
                    params![user_id, id],
                )
                .map_err(map_sql_error)?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_blocks(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<TimeBlock>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BLOCK_COLUMNS} FROM time_blocks WHERE user_id = ?1 ORDER BY start_time ASC"
    ))?;
    let rows = stmt.query_map(params![user_id], map_block_row)?;
    rows.collect()
}

fn map_block_row(row: &Row<'_>) -> rusqlite::Result<TimeBlock> {
    Ok(TimeBlock {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        start_time: read_timestamp(row, 4)?,
        end_time: read_timestamp(row, 5)?,
        google_event_id: row.get(6)?,
        updated_at: read_timestamp(row, 7)?,
    })
}
