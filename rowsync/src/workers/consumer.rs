use tokio::task::JoinHandle;
use tracing::{Instrument, error, info};

use crate::concurrency::shutdown::ShutdownRx;
use crate::dispatch::EventDispatcher;
use crate::error::{ErrorKind, RowsyncError, RowsyncResult};
use crate::metadata::MetadataProvider;
use crate::source::EventStream;
use crate::workers::base::{Worker, WorkerHandle};
use crate::{bail, rowsync_error};

#[derive(Debug)]
pub struct ConsumerWorkerHandle {
    handle: Option<JoinHandle<RowsyncResult<()>>>,
}

impl WorkerHandle for ConsumerWorkerHandle {
    async fn wait(mut self) -> RowsyncResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        handle.await.map_err(|err| {
            rowsync_error!(
                ErrorKind::ConsumerWorkerPanic,
                "The consumer worker task failed to join",
                err
            )
        })?
    }
}

/// The worker that drives the consume loop.
///
/// It pulls decoded events off the stream one at a time and hands them to the
/// dispatcher, preserving upstream order. The loop ends when the shutdown signal
/// fires, the stream closes, or the stream fails. Dropping the worker's dispatcher
/// on exit closes the rotation channel, which is what winds down the checkpoint
/// worker.
pub struct ConsumerWorker<S, M> {
    stream: S,
    dispatcher: EventDispatcher<M>,
    shutdown_rx: ShutdownRx,
}

impl<S, M> ConsumerWorker<S, M> {
    pub fn new(stream: S, dispatcher: EventDispatcher<M>, shutdown_rx: ShutdownRx) -> Self {
        Self {
            stream,
            dispatcher,
            shutdown_rx,
        }
    }
}

impl<S, M> Worker<ConsumerWorkerHandle> for ConsumerWorker<S, M>
where
    S: EventStream + 'static,
    M: MetadataProvider + Send + Sync + 'static,
{
    type Error = RowsyncError;

    async fn start(self) -> Result<ConsumerWorkerHandle, Self::Error> {
        info!("starting consumer worker");

        let consumer_worker_span = tracing::info_span!("consumer_worker");
        let consumer_worker = async move {
            let Self {
                mut stream,
                mut dispatcher,
                mut shutdown_rx,
            } = self;

            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.changed() => {
                        info!("consumer worker received shutdown signal");

                        return Ok(());
                    }

                    next_event = stream.next_event() => {
                        match next_event {
                            Ok(Some(event)) => dispatcher.handle_event(event).await,
                            Ok(None) => {
                                bail!(
                                    ErrorKind::SourceStreamClosed,
                                    "The upstream source closed the event stream"
                                );
                            }
                            Err(err) => {
                                error!(error = %err, "the event stream failed");

                                return Err(err);
                            }
                        }
                    }
                }
            }
        }
        .instrument(consumer_worker_span);

        let handle = tokio::spawn(consumer_worker);

        Ok(ConsumerWorkerHandle {
            handle: Some(handle),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;
    use tokio::sync::mpsc;

    use crate::concurrency::shutdown::create_shutdown_channel;
    use crate::handler::{HandlerFanout, MemoryHandler};
    use crate::metadata::MemoryMetadataProvider;
    use crate::schema::SchemaCache;
    use crate::types::{ActionKind, Event, RowMutationEvent, ScalarValue, TableName};

    struct ChannelStream {
        events_rx: mpsc::Receiver<Event>,
    }

    impl EventStream for ChannelStream {
        async fn next_event(&mut self) -> RowsyncResult<Option<Event>> {
            Ok(self.events_rx.recv().await)
        }
    }

    async fn orders_provider() -> MemoryMetadataProvider {
        let provider = MemoryMetadataProvider::new();
        provider
            .add_table(
                TableName::new("shop", "orders"),
                vec!["id".into(), "name".into()],
            )
            .await;

        provider
    }

    fn orders_insert() -> Event {
        Event::RowMutation(RowMutationEvent {
            table: TableName::new("shop", "orders"),
            action: ActionKind::Insert,
            values: vec![ScalarValue::Int(1), ScalarValue::from("alice")],
            old_values: None,
        })
    }

    #[tokio::test]
    async fn test_events_flow_until_the_stream_closes() {
        let (events_tx, events_rx) = mpsc::channel(8);
        let (rotation_tx, _rotation_rx) = mpsc::channel(1);
        let handler = MemoryHandler::new();
        let dispatcher = EventDispatcher::new(
            SchemaCache::new(orders_provider().await),
            HandlerFanout::new(vec![Box::new(handler.clone())]),
            rotation_tx,
        );
        let (_shutdown_tx, shutdown_rx) = create_shutdown_channel();

        let handle = ConsumerWorker::new(ChannelStream { events_rx }, dispatcher, shutdown_rx)
            .start()
            .await
            .unwrap();

        events_tx.send(orders_insert()).await.unwrap();
        events_tx.send(orders_insert()).await.unwrap();
        drop(events_tx);

        let result = handle.wait().await;
        assert_eq!(
            result.unwrap_err().kind(),
            ErrorKind::SourceStreamClosed
        );
        assert_eq!(handler.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_stops_a_blocked_consumer() {
        let (_events_tx, events_rx) = mpsc::channel(1);
        let (rotation_tx, _rotation_rx) = mpsc::channel(1);
        let dispatcher = EventDispatcher::new(
            SchemaCache::new(MemoryMetadataProvider::new()),
            HandlerFanout::new(vec![]),
            rotation_tx,
        );
        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();

        let handle = ConsumerWorker::new(ChannelStream { events_rx }, dispatcher, shutdown_rx)
            .start()
            .await
            .unwrap();

        shutdown_tx.shutdown().unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle.wait())
            .await
            .expect("consumer did not stop in time")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stream_errors_are_fatal_to_the_consumer() {
        struct FailingStream;

        impl EventStream for FailingStream {
            async fn next_event(&mut self) -> RowsyncResult<Option<Event>> {
                Err(rowsync_error!(
                    ErrorKind::SourceStreamFailed,
                    "Scripted stream failure"
                ))
            }
        }

        let (rotation_tx, _rotation_rx) = mpsc::channel(1);
        let dispatcher = EventDispatcher::new(
            SchemaCache::new(MemoryMetadataProvider::new()),
            HandlerFanout::new(vec![]),
            rotation_tx,
        );
        let (_shutdown_tx, shutdown_rx) = create_shutdown_channel();

        let handle = ConsumerWorker::new(FailingStream, dispatcher, shutdown_rx)
            .start()
            .await
            .unwrap();

        let result = handle.wait().await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::SourceStreamFailed);
    }
}
