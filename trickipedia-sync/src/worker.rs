//! Background auto-sync loop.
//!
//! Attempts a gated sync:
//! - once at startup
//! - whenever connectivity flips back to online
//! - on every check interval tick
//! - on an explicit `SyncNow` command
//!
//! Every attempt goes through `OfflineSync::sync`, so the interval gate and
//! failure handling are the same as for a direct call.

use crate::error::{SyncError, SyncResult};
use crate::offline_sync::OfflineSync;
use crate::types::{SyncCommand, SyncOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Handle for sending commands to a running worker.
#[derive(Clone)]
pub struct OfflineSyncHandle {
    command_tx: mpsc::Sender<SyncCommand>,
}

impl OfflineSyncHandle {
    pub async fn sync_now(&self) -> SyncResult<()> {
        self.command_tx
            .send(SyncCommand::SyncNow)
            .await
            .map_err(|_| SyncError::WorkerStopped)
    }

    pub async fn stop(&self) -> SyncResult<()> {
        self.command_tx
            .send(SyncCommand::Stop)
            .await
            .map_err(|_| SyncError::WorkerStopped)
    }
}

pub struct OfflineSyncWorker {
    sync: Arc<OfflineSync>,
    command_rx: mpsc::Receiver<SyncCommand>,
    connectivity_rx: watch::Receiver<bool>,
    check_interval: Duration,
}

/// Creates a worker and the handle that controls it. Spawn `worker.run()`.
pub fn create_offline_sync_worker(
    sync: Arc<OfflineSync>,
    check_interval: Duration,
) -> (OfflineSyncHandle, OfflineSyncWorker) {
    let (command_tx, command_rx) = mpsc::channel(16);
    let connectivity_rx = sync.connectivity().subscribe();

    let worker = OfflineSyncWorker {
        sync,
        command_rx,
        connectivity_rx,
        check_interval,
    };

    (OfflineSyncHandle { command_tx }, worker)
}

impl OfflineSyncWorker {
    pub async fn run(mut self) {
        info!("offline sync worker started");
        self.attempt("startup").await;

        let mut check = tokio::time::interval(self.check_interval);
        check.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip first immediate tick
        check.tick().await;

        loop {
            tokio::select! {
                _ = check.tick() => {
                    self.attempt("interval").await;
                }
                changed = self.connectivity_rx.changed() => {
                    if changed.is_err() {
                        info!("connectivity source dropped, stopping offline sync worker");
                        break;
                    }
                    let online = *self.connectivity_rx.borrow_and_update();
                    if online {
                        self.attempt("reconnect").await;
                    } else {
                        debug!("went offline, waiting for connectivity");
                    }
                }
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SyncCommand::SyncNow) => self.attempt("command").await,
                        Some(SyncCommand::Stop) => {
                            info!("offline sync worker stopping");
                            break;
                        }
                        None => {
                            info!("command channel closed, stopping offline sync worker");
                            break;
                        }
                    }
                }
            }
        }

        info!("offline sync worker stopped");
    }

    async fn attempt(&self, trigger: &str) {
        match self.sync.sync().await {
            SyncOutcome::Synced(report) => {
                debug!("{trigger} sync wrote {} tricks", report.tricks);
            }
            SyncOutcome::Skipped => debug!("{trigger} sync not due"),
            // Already logged by OfflineSync::sync
            SyncOutcome::Failed { .. } => {}
        }
    }
}
