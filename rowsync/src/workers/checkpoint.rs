use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info};

use crate::checkpoint::CheckpointStore;
use crate::error::{ErrorKind, RowsyncError, RowsyncResult};
use crate::rowsync_error;
use crate::workers::base::{Worker, WorkerHandle};

#[derive(Debug)]
pub struct CheckpointWorkerHandle {
    handle: Option<JoinHandle<RowsyncResult<()>>>,
}

impl WorkerHandle for CheckpointWorkerHandle {
    async fn wait(mut self) -> RowsyncResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        handle.await.map_err(|err| {
            rowsync_error!(
                ErrorKind::CheckpointWorkerPanic,
                "The checkpoint worker task failed to join",
                err
            )
        })?
    }
}

/// The worker that turns segment signals into durable checkpoint saves.
///
/// It drains the rotation channel until every sender is dropped, which is how the
/// consumer side signals that no more segments are coming. A failed save ends this
/// worker; consumption elsewhere is unaffected, durable position simply stops
/// advancing.
#[derive(Debug)]
pub struct CheckpointWorker {
    store: CheckpointStore,
    rotation_rx: mpsc::Receiver<String>,
}

impl CheckpointWorker {
    pub fn new(store: CheckpointStore, rotation_rx: mpsc::Receiver<String>) -> Self {
        Self { store, rotation_rx }
    }
}

impl Worker<CheckpointWorkerHandle> for CheckpointWorker {
    type Error = RowsyncError;

    async fn start(self) -> Result<CheckpointWorkerHandle, Self::Error> {
        info!("starting checkpoint worker");

        let checkpoint_worker_span = tracing::info_span!("checkpoint_worker");
        let checkpoint_worker = async move {
            let Self {
                store,
                mut rotation_rx,
            } = self;

            // The first signal after startup re-announces the segment the stream
            // resumed into, so persisting it would record no forward progress.
            let mut seen_first_signal = false;

            while let Some(segment) = rotation_rx.recv().await {
                if !seen_first_signal {
                    seen_first_signal = true;
                    info!(segment = %segment, "skipping warm-up segment signal");

                    continue;
                }

                if let Err(err) = store.save(&segment).await {
                    error!(segment = %segment, error = %err, "failed to persist checkpoint");

                    return Err(err);
                }
            }

            info!("checkpoint worker completed successfully");

            Ok(())
        }
        .instrument(checkpoint_worker_span);

        let handle = tokio::spawn(checkpoint_worker);

        Ok(CheckpointWorkerHandle {
            handle: Some(handle),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    async fn store_in(dir: &TempDir) -> CheckpointStore {
        CheckpointStore::new(dir.path()).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_signal_is_warm_up_and_not_persisted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;

        let (rotation_tx, rotation_rx) = mpsc::channel(1);
        let handle = CheckpointWorker::new(store.clone(), rotation_rx)
            .start()
            .await
            .unwrap();

        rotation_tx.send("binlog.000001".to_owned()).await.unwrap();
        drop(rotation_tx);
        handle.wait().await.unwrap();

        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_signals_after_warm_up_are_persisted_in_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;

        let (rotation_tx, rotation_rx) = mpsc::channel(1);
        let handle = CheckpointWorker::new(store.clone(), rotation_rx)
            .start()
            .await
            .unwrap();

        for segment in ["binlog.000001", "binlog.000002", "binlog.000003"] {
            rotation_tx.send(segment.to_owned()).await.unwrap();
        }
        drop(rotation_tx);
        handle.wait().await.unwrap();

        // The first signal is warm-up, so only the second and third were saved.
        let content = std::fs::read_to_string(
            dir.path().join(crate::checkpoint::CHECKPOINT_FILE_NAME),
        )
        .unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["binlog.000002", "binlog.000003"]);

        // A store reopened on the same directory sees the same durable position.
        let reopened = store_in(&dir).await;
        assert_eq!(reopened.load().await.as_deref(), Some("binlog.000003"));
    }

    #[tokio::test]
    async fn test_closed_channel_ends_the_worker_cleanly() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;

        let (rotation_tx, rotation_rx) = mpsc::channel::<String>(1);
        let handle = CheckpointWorker::new(store, rotation_rx).start().await.unwrap();

        drop(rotation_tx);

        handle.wait().await.unwrap();
    }
}
