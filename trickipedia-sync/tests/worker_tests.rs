mod support;

use std::sync::Arc;
use std::time::Duration;
use support::*;
use trickipedia_sync::{OfflineSync, SyncConfig, SyncError, create_offline_sync_worker};
use wiremock::MockServer;

async fn wait_for_sync(sync: &OfflineSync) -> bool {
    for _ in 0..200 {
        if sync.last_sync_at().unwrap().is_some() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn worker_syncs_on_startup_when_online() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let sync = Arc::new(offline_sync(&server, true));

    let (handle, worker) = create_offline_sync_worker(sync.clone(), Duration::from_secs(3600));
    let task = tokio::spawn(worker.run());

    assert!(wait_for_sync(&sync).await);
    handle.stop().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn reconnect_triggers_sync() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let sync = Arc::new(offline_sync(&server, false));

    let (handle, worker) = create_offline_sync_worker(sync.clone(), Duration::from_secs(3600));
    let task = tokio::spawn(worker.run());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sync.last_sync_at().unwrap().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());

    sync.connectivity().set_online(true);
    assert!(wait_for_sync(&sync).await);

    handle.stop().await.unwrap();
    task.await.unwrap();
}

async fn wait_for_calls(source: &ScriptedSource, expected: usize) -> bool {
    for _ in 0..200 {
        if source.calls() >= expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test(start_paused = true)]
async fn interval_tick_syncs_once_the_cache_goes_stale() {
    let source = Arc::new(ScriptedSource::ok());
    let sync = Arc::new(scripted_sync(source.clone(), &SyncConfig::default(), true));

    let (handle, worker) = create_offline_sync_worker(sync.clone(), Duration::from_secs(60));
    let task = tokio::spawn(worker.run());
    assert!(wait_for_calls(&source, 1).await);

    // A tick inside the sync interval is gated.
    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(!wait_for_calls(&source, 2).await);

    sync.store()
        .record_sync(chrono::Utc::now() - chrono::Duration::hours(25))
        .unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(wait_for_calls(&source, 2).await);
    assert!(!sync.should_sync());

    handle.stop().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn sync_now_runs_a_gated_attempt() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let sync = Arc::new(offline_sync(&server, true));

    let (handle, worker) = create_offline_sync_worker(sync.clone(), Duration::from_secs(3600));
    let task = tokio::spawn(worker.run());
    assert!(wait_for_sync(&sync).await);

    // Inside the interval, so the command must not refetch.
    handle.sync_now().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    handle.stop().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn commands_fail_after_stop() {
    let server = MockServer::start().await;
    let sync = Arc::new(offline_sync(&server, false));

    let (handle, worker) = create_offline_sync_worker(sync, Duration::from_secs(3600));
    let task = tokio::spawn(worker.run());

    handle.stop().await.unwrap();
    task.await.unwrap();

    assert!(matches!(handle.sync_now().await, Err(SyncError::WorkerStopped)));
}

#[tokio::test]
async fn dropping_every_handle_stops_the_worker() {
    let server = MockServer::start().await;
    let sync = Arc::new(offline_sync(&server, false));

    let (handle, worker) = create_offline_sync_worker(sync, Duration::from_secs(3600));
    let task = tokio::spawn(worker.run());
    drop(handle);

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("worker should exit once its command channel closes")
        .unwrap();
}
