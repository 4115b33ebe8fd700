//! Conversions from external infrastructure errors into domain errors.

use goalpro_domain::GoalProError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GoalProError);

impl From<InfraError> for GoalProError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GoalProError> for InfraError {
    fn from(value: GoalProError) -> Self {
        InfraError(value)
    }
}

trait IntoGoalProError {
    fn into_goalpro(self) -> GoalProError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → GoalProError */
/* -------------------------------------------------------------------------- */

impl IntoGoalProError for SqlError {
    fn into_goalpro(self) -> GoalProError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        GoalProError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        GoalProError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        GoalProError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        GoalProError::Database("foreign key constraint violation".into())
                    }
                    _ => GoalProError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => GoalProError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                GoalProError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                GoalProError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => GoalProError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => GoalProError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_goalpro())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → GoalProError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(GoalProError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GoalProError */
/* -------------------------------------------------------------------------- */

impl IntoGoalProError for HttpError {
    fn into_goalpro(self) -> GoalProError {
        if self.is_timeout() {
            return GoalProError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return GoalProError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => GoalProError::ProviderAuth(message),
                404 | 410 => GoalProError::NotFound(message),
                400..=499 => GoalProError::InvalidInput(message),
                _ => GoalProError::Network(message),
            };
        }

        if self.is_decode() {
            return GoalProError::Network(format!("failed to decode provider response: {self}"));
        }

        GoalProError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_goalpro())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
