//! SQLite implementation of the WebhookChannelRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use goalpro_core::WebhookChannelRepository;
use goalpro_domain::{Result as DomainResult, WebhookChannel};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::{read_optional_timestamp, to_millis};

const CHANNEL_COLUMNS: &str = "channel_id, resource_id, token, user_id, is_active, expiration";

/// SQLite-backed storage for registered push channels.
pub struct SqliteWebhookChannelRepository {
    db: Arc<DbManager>,
}

impl SqliteWebhookChannelRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WebhookChannelRepository for SqliteWebhookChannelRepository {
    async fn find(&self, channel_id: &str) -> DomainResult<Option<WebhookChannel>> {
        let db = Arc::clone(&self.db);
        let channel_id = channel_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<WebhookChannel>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!(
                    "SELECT {CHANNEL_COLUMNS} FROM calendar_webhook_channels WHERE channel_id = ?1"
                ),
                params![channel_id],
                map_channel_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, channel: &WebhookChannel) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let channel = channel.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO calendar_webhook_channels (
                    channel_id, resource_id, token, user_id, is_active, expiration, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    channel.channel_id,
                    channel.resource_id,
                    channel.token,
                    channel.user_id,
                    channel.is_active,
                    channel.expiration.map(to_millis),
                    to_millis(Utc::now()),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_active_for_user(&self, user_id: &str) -> DomainResult<Vec<WebhookChannel>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<WebhookChannel>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {CHANNEL_COLUMNS} FROM calendar_webhook_channels
                     WHERE user_id = ?1 AND is_active = 1
                     ORDER BY created_at ASC"
                ))
                .map_err(map_sql_error)?;
            let rows = stmt.query_map(params![user_id], map_channel_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(skip(self))]
    async fn deactivate_for_user(&self, user_id: &str) -> DomainResult<u64> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        let deactivated = task::spawn_blocking(move || -> DomainResult<u64> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE calendar_webhook_channels SET is_active = 0
                     WHERE user_id = ?1 AND is_active = 1",
                    params![user_id],
                )
                .map_err(map_sql_error)?;
            Ok(changed as u64)
        })
        .await
        .map_err(map_join_error)??;

        debug!(deactivated, "webhook channels deactivated");
        Ok(deactivated)
    }
}

fn map_channel_row(row: &Row<'_>) -> rusqlite::Result<WebhookChannel> {
    Ok(WebhookChannel {
        channel_id: row.get(0)?,
        resource_id: row.get(1)?,
        token: row.get(2)?,
        user_id: row.get(3)?,
        is_active: row.get(4)?,
        expiration: read_optional_timestamp(row, 5)?,
    })
}
