//! Tracing setup and log helpers.

use goalpro_domain::GoalProError;
use tracing_subscriber::EnvFilter;

/// Output format selected with `GOALPRO_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects JSON lines; anything else is the human-readable format.
    pub fn from_env() -> Self {
        match std::env::var("GOALPRO_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`
/// filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "tracing subscriber already installed");
    }
}

/// Convert a `GoalProError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &GoalProError) -> &'static str {
    match error {
        GoalProError::Database(_) => "database",
        GoalProError::Config(_) => "config",
        GoalProError::Network(_) => "network",
        GoalProError::Auth(_) => "auth",
        GoalProError::ProviderAuth(_) => "provider_auth",
        GoalProError::Forbidden(_) => "forbidden",
        GoalProError::Security(_) => "security",
        GoalProError::NotFound(_) => "not_found",
        GoalProError::InvalidInput(_) => "invalid_input",
        GoalProError::NotConnected(_) => "not_connected",
        GoalProError::Internal(_) => "internal",
    }
}
