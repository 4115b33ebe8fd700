//! HTTP mapping of domain errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use goalpro_domain::GoalProError;
use serde_json::json;
use tracing::{error, warn};

use crate::utils::logging::error_label;

/// Handler error rendered as `{"error": "..."}` with a status derived from
/// the domain error kind.
#[derive(Debug)]
pub struct ApiError(pub GoalProError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GoalProError::Config(_) | GoalProError::Database(_) | GoalProError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GoalProError::Auth(_) | GoalProError::Security(_) => StatusCode::UNAUTHORIZED,
            GoalProError::Forbidden(_) => StatusCode::FORBIDDEN,
            GoalProError::NotFound(_) => StatusCode::NOT_FOUND,
            GoalProError::InvalidInput(_) | GoalProError::NotConnected(_) => {
                StatusCode::BAD_REQUEST
            }
            GoalProError::Network(_) | GoalProError::ProviderAuth(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message exposed to the client. Storage and internal details stay in
    /// the logs.
    fn public_message(&self) -> String {
        match &self.0 {
            GoalProError::Database(_) | GoalProError::Internal(_) => {
                "internal server error".to_string()
            }
            GoalProError::ProviderAuth(_) => {
                "Google Calendar rejected the stored authorization; reconnect the calendar"
                    .to_string()
            }
            GoalProError::Config(msg)
            | GoalProError::Auth(msg)
            | GoalProError::Security(msg)
            | GoalProError::Forbidden(msg)
            | GoalProError::NotFound(msg)
            | GoalProError::InvalidInput(msg)
            | GoalProError::NotConnected(msg)
            | GoalProError::Network(msg) => msg.clone(),
        }
    }
}

impl From<GoalProError> for ApiError {
    fn from(err: GoalProError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = error_label(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, kind, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self.0, kind, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_status_codes() {
        let cases = [
            (GoalProError::Config("c".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (GoalProError::Database("d".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (GoalProError::Auth("a".into()), StatusCode::UNAUTHORIZED),
            (GoalProError::Security("s".into()), StatusCode::UNAUTHORIZED),
            (GoalProError::Forbidden("f".into()), StatusCode::FORBIDDEN),
            (GoalProError::NotFound("n".into()), StatusCode::NOT_FOUND),
            (GoalProError::InvalidInput("i".into()), StatusCode::BAD_REQUEST),
            (GoalProError::NotConnected("nc".into()), StatusCode::BAD_REQUEST),
            (GoalProError::Network("net".into()), StatusCode::BAD_GATEWAY),
            (GoalProError::ProviderAuth("pa".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn database_details_are_not_exposed() {
        let err = ApiError(GoalProError::Database("no such table: secrets".into()));
        assert_eq!(err.public_message(), "internal server error");
    }

    #[test]
    fn provider_rejection_hides_provider_message() {
        let err = ApiError(GoalProError::ProviderAuth("Token refresh failed (400)".into()));
        assert!(err.public_message().contains("reconnect"));
        assert!(!err.public_message().contains("400"));
    }
}
