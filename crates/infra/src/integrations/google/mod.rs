//! Google Calendar and Google OAuth adapters.

pub mod calendar;
pub mod oauth;
mod wire;

use std::time::Duration;

use goalpro_domain::{GoalProError, Result};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::errors::InfraError;

pub use calendar::GoogleCalendarClient;
pub use oauth::GoogleOAuthClient;

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(InfraError::from)?)
}

/// Append percent-encoded path segments to `base`.
pub(crate) fn join_segments(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| GoalProError::Config(format!("invalid Google endpoint {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| GoalProError::Config(format!("Google endpoint cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Translate a non-success provider response into a domain error.
///
/// The response body stays in the debug log and never enters the message.
pub(crate) async fn provider_error(response: Response, context: &str) -> GoalProError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %body, "{context}");
    let message = format!("{context} ({status})");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GoalProError::ProviderAuth(message),
        StatusCode::NOT_FOUND | StatusCode::GONE => GoalProError::NotFound(message),
        _ => GoalProError::Network(message),
    }
}
