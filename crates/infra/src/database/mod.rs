//! SQLite persistence: pool manager and repository implementations.

pub mod credential_repository;
pub mod manager;
pub mod session_repository;
pub mod sync_record_repository;
pub mod sync_settings_repository;
pub mod time_block_repository;
pub mod webhook_channel_repository;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

pub use credential_repository::SqliteCredentialRepository;
pub use manager::*;
pub use session_repository::SqliteSessionRepository;
pub use sync_record_repository::SqliteSyncRecordRepository;
pub use sync_settings_repository::SqliteSyncSettingsRepository;
pub use time_block_repository::SqliteTimeBlockRepository;
pub use webhook_channel_repository::SqliteWebhookChannelRepository;

pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn read_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    millis_to_datetime(millis, idx)
}

pub(crate) fn read_optional_timestamp(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(idx)?.map(|millis| millis_to_datetime(millis, idx)).transpose()
}

fn millis_to_datetime(millis: i64, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

/// Wrap a parse failure for column `idx` as a rusqlite conversion error.
pub(crate) fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
