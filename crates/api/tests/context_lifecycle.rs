//! AppContext construction and background task lifecycle.

mod support;

use std::time::Duration;

use goalpro_api::AppContext;
use goalpro_core::{SyncJobQueue, SyncTrigger};
use support::test_config;
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test(flavor = "multi_thread")]
async fn background_tasks_start_and_shut_down() {
    let temp_dir = TempDir::new().expect("temp dir");
    let google = MockServer::start().await;
    let mut config = test_config(&temp_dir, &google);
    config.sync.auto_sync_enabled = true;

    let (ctx, mut tasks) = AppContext::new(config).expect("context");
    tasks.start().await.expect("start background tasks");
    assert!(tasks.is_running());

    // No credential: the worker logs the failure and keeps draining.
    ctx.queue.enqueue("user-1", SyncTrigger::Admin).await.expect("enqueue");
    tokio::time::timeout(Duration::from_secs(5), async {
        while ctx.queue.pending_len() > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("worker drained the queue");

    tasks.shutdown().await;
    assert!(!tasks.is_running());
}

#[tokio::test]
async fn context_reopens_existing_database() {
    let temp_dir = TempDir::new().expect("temp dir");
    let google = MockServer::start().await;

    let (first, _tasks) = AppContext::new(test_config(&temp_dir, &google)).expect("first open");
    drop(first);

    let (second, _tasks) = AppContext::new(test_config(&temp_dir, &google)).expect("second open");
    second.db.health_check().expect("healthy database");
}
