//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use goalpro_core::{
    AccessTokenSource, AnonymousIdentityPolicy, CalendarProvider, CalendarSyncService,
    ChannelService, ConnectionService, CredentialRepository, OAuthProvider, OAuthStateSigner,
    PrincipalResolver, SessionResolver, SyncJobQueue, SyncRecordRepository, SyncRunner,
    SyncSettingsRepository, SyncSettingsService, TimeBlockRepository, TimeBlockService,
    WebhookChannelRepository, WebhookService,
};
use goalpro_domain::{Config, Result};
use goalpro_infra::{
    sync_queue, AutoSyncScheduler, AutoSyncSchedulerConfig, DbManager, GoogleCalendarClient,
    GoogleOAuthClient, SqliteCredentialRepository, SqliteSessionRepository,
    SqliteSyncRecordRepository, SqliteSyncSettingsRepository, SqliteTimeBlockRepository,
    SqliteWebhookChannelRepository, SyncWorker, SyncWorkerConfig, TokioSyncQueue,
};
use tracing::{info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub identity: Arc<PrincipalResolver>,
    pub sessions: Arc<SqliteSessionRepository>,

    // Calendar services
    pub connections: Arc<ConnectionService>,
    pub sync: Arc<CalendarSyncService>,
    pub channels: Arc<ChannelService>,
    pub webhooks: Arc<WebhookService>,
    pub settings: Arc<SyncSettingsService>,
    pub time_blocks: Arc<TimeBlockService>,

    // Sync job queue shared by webhook, admin and scheduler producers
    pub queue: Arc<TokioSyncQueue>,
}

/// Long-running tasks owned by the binary, started after the context.
pub struct BackgroundTasks {
    worker: SyncWorker,
    scheduler: Option<AutoSyncScheduler>,
}

impl AppContext {
    /// Open the database, run migrations and wire every service.
    ///
    /// Returns the context together with its (not yet started) background
    /// tasks.
    pub fn new(config: Config) -> Result<(Self, BackgroundTasks)> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        // Repositories
        let credentials: Arc<dyn CredentialRepository> =
            Arc::new(SqliteCredentialRepository::new(Arc::clone(&db)));
        let records: Arc<dyn SyncRecordRepository> =
            Arc::new(SqliteSyncRecordRepository::new(Arc::clone(&db)));
        let settings_repo: Arc<dyn SyncSettingsRepository> =
            Arc::new(SqliteSyncSettingsRepository::new(Arc::clone(&db)));
        let channel_repo: Arc<dyn WebhookChannelRepository> =
            Arc::new(SqliteWebhookChannelRepository::new(Arc::clone(&db)));
        let time_block_repo: Arc<dyn TimeBlockRepository> =
            Arc::new(SqliteTimeBlockRepository::new(Arc::clone(&db)));
        let sessions = Arc::new(SqliteSessionRepository::new(Arc::clone(&db)));

        // Google clients
        let oauth: Arc<dyn OAuthProvider> =
            Arc::new(GoogleOAuthClient::new(config.google.clone())?);
        let calendar: Arc<dyn CalendarProvider> =
            Arc::new(GoogleCalendarClient::new(&config.google)?);
        if !config.google.has_credentials() {
            warn!("google client credentials missing; calendar connect is disabled");
        }

        let tokens = Arc::new(AccessTokenSource::new(Arc::clone(&credentials), Arc::clone(&oauth)));

        let connections = Arc::new(ConnectionService::new(
            Arc::clone(&credentials),
            Arc::clone(&channel_repo),
            Arc::clone(&oauth),
            state_signer(&config),
        ));
        let sync = Arc::new(CalendarSyncService::new(
            Arc::clone(&tokens),
            Arc::clone(&calendar),
            Arc::clone(&records),
            Arc::clone(&time_block_repo),
            Arc::clone(&settings_repo),
        ));
        let channels = Arc::new(ChannelService::new(
            Arc::clone(&tokens),
            Arc::clone(&calendar),
            Arc::clone(&channel_repo),
            config.google.webhook_url.clone(),
        ));

        let (queue, receiver) = sync_queue(config.sync.queue_capacity);
        let queue = Arc::new(queue);
        let job_queue: Arc<dyn SyncJobQueue> = Arc::clone(&queue) as Arc<dyn SyncJobQueue>;

        let webhooks = Arc::new(WebhookService::new(
            Arc::clone(&channel_repo),
            Arc::clone(&settings_repo),
            Arc::clone(&records),
            Arc::clone(&job_queue),
        ));
        let settings = Arc::new(SyncSettingsService::new(Arc::clone(&settings_repo)));
        let time_blocks = Arc::new(TimeBlockService::new(time_block_repo));

        let identity = Arc::new(PrincipalResolver::new(
            Arc::clone(&sessions) as Arc<dyn SessionResolver>,
            AnonymousIdentityPolicy::from_config(config.app.anonymous_user_id.as_deref()),
        ));

        let runner: Arc<dyn SyncRunner> = Arc::clone(&sync) as Arc<dyn SyncRunner>;
        let worker = SyncWorker::new(
            receiver,
            runner,
            SyncWorkerConfig {
                job_timeout: Duration::from_secs(config.sync.job_timeout_secs.max(1)),
                ..SyncWorkerConfig::default()
            },
        );
        let scheduler = config.sync.auto_sync_enabled.then(|| {
            AutoSyncScheduler::new(
                AutoSyncSchedulerConfig {
                    cron_expression: config.sync.auto_sync_cron.clone(),
                    ..AutoSyncSchedulerConfig::default()
                },
                settings_repo,
                job_queue,
            )
        });

        info!(db_path = %config.database.path, "application context initialised");

        let context = Self {
            config,
            db,
            identity,
            sessions,
            connections,
            sync,
            channels,
            webhooks,
            settings,
            time_blocks,
            queue,
        };
        Ok((context, BackgroundTasks { worker, scheduler }))
    }
}

fn state_signer(config: &Config) -> OAuthStateSigner {
    let ttl_secs = config.oauth.state_ttl_secs;
    match config.oauth.state_secret.as_deref().filter(|s| !s.is_empty()) {
        Some(secret) => OAuthStateSigner::new(secret.as_bytes().to_vec(), ttl_secs),
        None => {
            warn!("no OAuth state secret configured; using a per-process key");
            OAuthStateSigner::ephemeral(ttl_secs)
        }
    }
}

impl BackgroundTasks {
    /// Start the sync worker, then the auto-sync scheduler when enabled.
    pub async fn start(&mut self) -> Result<()> {
        self.worker.start()?;
        if let Some(scheduler) = self.scheduler.as_mut() {
            if let Err(e) = scheduler.start().await {
                if let Err(stop_err) = self.worker.stop().await {
                    warn!(error = %stop_err, "failed to stop sync worker after scheduler error");
                }
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Stop the scheduler first so no new jobs arrive, then drain the worker.
    pub async fn shutdown(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            if scheduler.is_running() {
                if let Err(e) = scheduler.stop().await {
                    warn!(error = %e, "auto-sync scheduler did not stop cleanly");
                }
            }
        }
        if self.worker.is_running() {
            if let Err(e) = self.worker.stop().await {
                warn!(error = %e, "sync worker did not stop cleanly");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }
}
