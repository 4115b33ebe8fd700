//! SQLite implementation of the CredentialRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_core::CredentialRepository;
use goalpro_domain::{IntegrationCredential, Result as DomainResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::{read_optional_timestamp, to_millis};

/// SQLite-backed OAuth credential storage keyed by user and provider.
pub struct SqliteCredentialRepository {
    db: Arc<DbManager>,
}

impl SqliteCredentialRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialRepository for SqliteCredentialRepository {
    async fn find(
        &self,
        user_id: &str,
        provider: &str,
    ) -> DomainResult<Option<IntegrationCredential>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let provider = provider.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<IntegrationCredential>> {
            let conn = db.get_connection()?;
            query_credential(&conn, &user_id, &provider).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    #[instrument(
        skip(self, credential),
        fields(user_id = %credential.user_id, provider = %credential.provider)
    )]
    async fn upsert(&self, credential: &IntegrationCredential) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let credential = credential.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_credential(&conn, &credential).map_err(map_sql_error)?;
            debug!("credential stored");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_access_token(
        &self,
        user_id: &str,
        provider: &str,
        access_token: &str,
        token_expiry: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let provider = provider.to_string();
        let access_token = access_token.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "UPDATE integration_credentials
                 SET access_token = ?3, token_expiry = ?4, updated_at = ?5
                 WHERE user_id = ?1 AND provider = ?2",
                params![
                    user_id,
                    provider,
                    access_token,
                    token_expiry.map(to_millis),
                    to_millis(Utc::now())
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete(&self, user_id: &str, provider: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let provider = provider.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let removed = conn
                .execute(
                    "DELETE FROM integration_credentials WHERE user_id = ?1 AND provider = ?2",
                    params![user_id, provider],
                )
                .map_err(map_sql_error)?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL helpers
// ============================================================================

fn query_credential(
    conn: &Connection,
    user_id: &str,
    provider: &str,
) -> rusqlite::Result<Option<IntegrationCredential>> {
    conn.query_row(
        "SELECT user_id, provider, access_token, refresh_token, token_expiry,
                scopes, provider_email, is_active
         FROM integration_credentials
         WHERE user_id = ?1 AND provider = ?2",
        params![user_id, provider],
        map_credential_row,
    )
    .optional()
}

fn upsert_credential(
    conn: &Connection,
    credential: &IntegrationCredential,
) -> rusqlite::Result<()> {
    let now = to_millis(Utc::now());
    conn.execute(
        "INSERT INTO integration_credentials (
            user_id, provider, access_token, refresh_token, token_expiry,
            scopes, provider_email, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
        ON CONFLICT(user_id, provider) DO UPDATE SET
            access_token = excluded.access_token,
            refresh_token = excluded.refresh_token,
            token_expiry = excluded.token_expiry,
            scopes = excluded.scopes,
            provider_email = excluded.provider_email,
            is_active = excluded.is_active,
            updated_at = excluded.updated_at",
        params![
            credential.user_id,
            credential.provider,
            credential.access_token,
            credential.refresh_token,
            credential.token_expiry.map(to_millis),
            credential.scopes.join(" "),
            credential.provider_email,
            credential.is_active,
            now,
        ],
    )?;
    Ok(())
}

fn map_credential_row(row: &Row<'_>) -> rusqlite::Result<IntegrationCredential> {
    let scopes: String = row.get(5)?;
    Ok(IntegrationCredential {
        user_id: row.get(0)?,
        provider: row.get(1)?,
        access_token: row.get(2)?,
        refresh_token: row.get(3)?,
        token_expiry: read_optional_timestamp(row, 4)?,
        scopes: scopes.split_whitespace().map(str::to_string).collect(),
        provider_email: row.get(6)?,
        is_active: row.get(7)?,
    })
}
