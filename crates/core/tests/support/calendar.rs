//! Mock Google provider, OAuth client and sync queue.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use goalpro_core::{
    CalendarProvider, EnqueueOutcome, OAuthProvider, SyncJobQueue, SyncTrigger, TokenGrant,
    WatchRequest, WatchResponse,
};
use goalpro_domain::{EventDraft, GoalProError, RemoteEvent, Result as DomainResult};

/// In-memory calendar keyed by event id.
///
/// Events listed in `failing` answer with a network error; every call is
/// recorded so tests can assert which events were fetched.
#[derive(Default, Clone)]
pub struct MockCalendarProvider {
    events: Arc<Mutex<HashMap<String, RemoteEvent>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    watches: Arc<Mutex<Vec<WatchRequest>>>,
    stopped: Arc<Mutex<Vec<String>>>,
    fail_stop: Arc<Mutex<bool>>,
}

impl MockCalendarProvider {
    pub fn with_event(self, event: RemoteEvent) -> Self {
        self.events.lock().unwrap().insert(event.id.clone(), event);
        self
    }

    pub fn failing_on(self, event_id: &str) -> Self {
        self.failing.lock().unwrap().insert(event_id.to_string());
        self
    }

    pub fn failing_stop(self) -> Self {
        *self.fail_stop.lock().unwrap() = true;
        self
    }

    pub fn event(&self, event_id: &str) -> Option<RemoteEvent> {
        self.events.lock().unwrap().get(event_id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn watches(&self) -> Vec<WatchRequest> {
        self.watches.lock().unwrap().clone()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }

    fn store(&self, id: String, draft: &EventDraft) -> RemoteEvent {
        let event = RemoteEvent {
            id: id.clone(),
            summary: Some(draft.summary.clone()),
            description: draft.description.clone(),
            start: draft.start,
            end: draft.end,
            updated: Utc::now(),
            cancelled: false,
        };
        self.events.lock().unwrap().insert(id, event.clone());
        event
    }
}

#[async_trait]
impl CalendarProvider for MockCalendarProvider {
    async fn get_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event_id: &str,
    ) -> DomainResult<Option<RemoteEvent>> {
        self.calls.lock().unwrap().push(format!("get:{event_id}"));
        if self.failing.lock().unwrap().contains(event_id) {
            return Err(GoalProError::Network("google returned 500".into()));
        }
        Ok(self.event(event_id))
    }

    async fn insert_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        draft: &EventDraft,
    ) -> DomainResult<RemoteEvent> {
        self.calls.lock().unwrap().push(format!("insert:{}", draft.summary));
        let id = format!("evt-{}", self.events.lock().unwrap().len() + 1);
        Ok(self.store(id, draft))
    }

    async fn update_event(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> DomainResult<RemoteEvent> {
        self.calls.lock().unwrap().push(format!("update:{event_id}"));
        Ok(self.store(event_id.to_string(), draft))
    }

    async fn watch_events(
        &self,
        _access_token: &str,
        _calendar_id: &str,
        request: &WatchRequest,
    ) -> DomainResult<WatchResponse> {
        self.watches.lock().unwrap().push(request.clone());
        Ok(WatchResponse {
            resource_id: format!("resource-{}", request.channel_id),
            expiration: Some(Utc::now() + Duration::days(7)),
        })
    }

    async fn stop_channel(
        &self,
        _access_token: &str,
        channel_id: &str,
        _resource_id: &str,
    ) -> DomainResult<()> {
        if *self.fail_stop.lock().unwrap() {
            return Err(GoalProError::Network("channels.stop failed".into()));
        }
        self.stopped.lock().unwrap().push(channel_id.to_string());
        Ok(())
    }
}

/// Scriptable OAuth client.
#[derive(Clone, Default)]
pub struct MockOAuthProvider {
    configured: bool,
    fail_exchange: bool,
    fail_revoke: bool,
    fail_email: bool,
    omit_refresh_token: bool,
    revoked: Arc<Mutex<Vec<String>>>,
    refreshed: Arc<Mutex<usize>>,
}

impl MockOAuthProvider {
    pub fn configured() -> Self {
        Self { configured: true, ..Self::default() }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn failing_exchange(mut self) -> Self {
        self.fail_exchange = true;
        self
    }

    pub fn failing_revoke(mut self) -> Self {
        self.fail_revoke = true;
        self
    }

    pub fn failing_email(mut self) -> Self {
        self.fail_email = true;
        self
    }

    pub fn without_refresh_token(mut self) -> Self {
        self.omit_refresh_token = true;
        self
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.lock().unwrap().clone()
    }

    pub fn refresh_count(&self) -> usize {
        *self.refreshed.lock().unwrap()
    }
}

#[async_trait]
impl OAuthProvider for MockOAuthProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn authorization_url(&self, state: &str) -> DomainResult<String> {
        Ok(format!("https://accounts.example.com/auth?state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> DomainResult<TokenGrant> {
        if self.fail_exchange {
            return Err(GoalProError::ProviderAuth("invalid_grant".into()));
        }
        Ok(TokenGrant {
            access_token: format!("access-{code}"),
            refresh_token: (!self.omit_refresh_token).then(|| format!("refresh-{code}")),
            expires_in: Some(3600),
            scope: Some("openid https://www.googleapis.com/auth/calendar.events".into()),
        })
    }

    async fn refresh_access_token(&self, _refresh_token: &str) -> DomainResult<TokenGrant> {
        *self.refreshed.lock().unwrap() += 1;
        Ok(TokenGrant {
            access_token: "refreshed-access".into(),
            refresh_token: None,
            expires_in: Some(3600),
            scope: None,
        })
    }

    async fn fetch_account_email(&self, _access_token: &str) -> DomainResult<String> {
        if self.fail_email {
            return Err(GoalProError::Network("userinfo unavailable".into()));
        }
        Ok("person@example.com".into())
    }

    async fn revoke_token(&self, token: &str) -> DomainResult<()> {
        self.revoked.lock().unwrap().push(token.to_string());
        if self.fail_revoke {
            return Err(GoalProError::Network("revoke endpoint unreachable".into()));
        }
        Ok(())
    }
}

/// Queue that only records what was enqueued.
#[derive(Default, Clone)]
pub struct RecordingSyncQueue {
    jobs: Arc<Mutex<Vec<(String, SyncTrigger)>>>,
}

impl RecordingSyncQueue {
    pub fn jobs(&self) -> Vec<(String, SyncTrigger)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncJobQueue for RecordingSyncQueue {
    async fn enqueue(&self, user_id: &str, trigger: SyncTrigger) -> DomainResult<EnqueueOutcome> {
        self.jobs.lock().unwrap().push((user_id.to_string(), trigger));
        Ok(EnqueueOutcome::Queued)
    }
}
