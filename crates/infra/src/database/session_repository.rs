//! Session token lookup backing the request principal middleware.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_core::{SessionIdentity, SessionResolver};
use goalpro_domain::{Result as DomainResult, Role};
use rusqlite::{params, OptionalExtension};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::{read_optional_timestamp, to_millis};

/// SQLite-backed bearer session lookup.
pub struct SqliteSessionRepository {
    db: Arc<DbManager>,
}

impl SqliteSessionRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store a session token. Replaces an existing row for the same token.
    pub async fn insert(
        &self,
        token: &str,
        user_id: &str,
        role: Role,
        expires_at: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let token = token.to_string();
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO sessions (token, user_id, role, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![token, user_id, role_label(role), expires_at.map(to_millis)],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl SessionResolver for SqliteSessionRepository {
    async fn resolve(&self, token: &str) -> DomainResult<Option<SessionIdentity>> {
        let db = Arc::clone(&self.db);
        let token = token.to_string();

        let row = task::spawn_blocking(
            move || -> DomainResult<Option<(String, String, Option<DateTime<Utc>>)>> {
                let conn = db.get_connection()?;
                conn.query_row(
                    "SELECT user_id, role, expires_at FROM sessions WHERE token = ?1",
                    params![token],
                    |row| Ok((row.get(0)?, row.get(1)?, read_optional_timestamp(row, 2)?)),
                )
                .optional()
                .map_err(map_sql_error)
            },
        )
        .await
        .map_err(map_join_error)??;

        let Some((user_id, role, expires_at)) = row else {
            return Ok(None);
        };
        if expires_at.is_some_and(|expiry| expiry <= Utc::now()) {
            return Ok(None);
        }

        let role = if role == "admin" { Role::Admin } else { Role::User };
        Ok(Some(SessionIdentity { user_id, role }))
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}
