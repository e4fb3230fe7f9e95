//! Core relay orchestration and execution.
//!
//! Contains the main [`Processor`] struct that coordinates the upstream event stream
//! with the registered sink handlers. Manages worker lifecycles, shutdown
//! coordination, and error handling.

use std::mem;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::bail;
use crate::checkpoint::CheckpointStore;
use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::dispatch::EventDispatcher;
use crate::error::{ErrorKind, RowsyncResult};
use crate::handler::{Handler, HandlerFanout};
use crate::metadata::MetadataProvider;
use crate::schema::SchemaCache;
use crate::source::EventSource;
use crate::types::StreamPosition;
use crate::workers::base::{Worker, WorkerHandle};
use crate::workers::checkpoint::{CheckpointWorker, CheckpointWorkerHandle};
use crate::workers::consumer::{ConsumerWorker, ConsumerWorkerHandle};

/// Internal state tracking for the processor lifecycle.
///
/// The processor can only be in one of these states at a time.
#[derive(Debug)]
enum ProcessorState {
    /// Processor has been created but not yet started.
    NotStarted,
    /// Processor is running with active workers.
    Started {
        consumer_worker: ConsumerWorkerHandle,
        checkpoint_worker: CheckpointWorkerHandle,
    },
}

/// The relay coordinator: one consume loop, one checkpoint writer.
///
/// A [`Processor`] connects an upstream event source to an ordered set of sink
/// handlers. It owns the schema cache used for row enrichment and the checkpoint
/// store used for durable position tracking, resolves where to start streaming
/// (configured position or last checkpoint), and supervises both workers until
/// shutdown.
pub struct Processor<S, M> {
    source: S,
    schema_cache: SchemaCache<M>,
    handlers: Vec<Box<dyn Handler>>,
    checkpoint_store: CheckpointStore,
    start_position: StreamPosition,
    resume_from_checkpoint: bool,
    state: ProcessorState,
    shutdown_tx: ShutdownTx,
}

impl<S, M> Processor<S, M>
where
    S: EventSource,
    M: MetadataProvider + Send + Sync + 'static,
{
    /// Creates a new processor in the not-started state.
    ///
    /// `start_position` is where streaming begins unless `resume_from_checkpoint` is
    /// set and the checkpoint store holds a position, in which case the stored
    /// segment wins. Handlers receive records in the order given here.
    pub fn new(
        source: S,
        metadata: M,
        handlers: Vec<Box<dyn Handler>>,
        checkpoint_store: CheckpointStore,
        start_position: StreamPosition,
        resume_from_checkpoint: bool,
    ) -> Self {
        // The shutdown receivers are created on demand via `subscribe`, so the
        // initial one is dropped here.
        let (shutdown_tx, _) = create_shutdown_channel();

        Self {
            source,
            schema_cache: SchemaCache::new(metadata),
            handlers,
            checkpoint_store,
            start_position,
            resume_from_checkpoint,
            state: ProcessorState::NotStarted,
            shutdown_tx,
        }
    }

    /// Returns a handle for sending shutdown signals to this processor.
    ///
    /// Multiple components can hold shutdown handles to coordinate graceful
    /// termination.
    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Starts the processor and begins relaying events.
    ///
    /// Resolves the starting position, spawns the checkpoint worker, connects the
    /// source, and spawns the consumer worker. Returns once both workers are running;
    /// use [`Processor::wait`] to follow them to completion.
    pub async fn start(&mut self) -> RowsyncResult<()> {
        if let ProcessorState::Started { .. } = self.state {
            bail!(
                ErrorKind::InvalidState,
                "The processor was already started"
            );
        }

        let position = self.resolve_start_position().await;
        info!(position = %position, "starting processor");

        // The channel is deliberately capacity 1: a slow checkpoint write may block
        // the consume loop at a rotation, never at row events.
        let (rotation_tx, rotation_rx) = mpsc::channel(1);

        let checkpoint_worker =
            CheckpointWorker::new(self.checkpoint_store.clone(), rotation_rx)
                .start()
                .await?;

        let stream = self.source.connect(position).await?;

        let dispatcher = EventDispatcher::new(
            self.schema_cache.clone(),
            HandlerFanout::new(mem::take(&mut self.handlers)),
            rotation_tx,
        );
        let consumer_worker = ConsumerWorker::new(stream, dispatcher, self.shutdown_tx.subscribe())
            .start()
            .await?;

        self.state = ProcessorState::Started {
            consumer_worker,
            checkpoint_worker,
        };

        Ok(())
    }

    /// Waits for the processor to terminate.
    ///
    /// Blocks until both workers have finished. The consumer is waited on first:
    /// once it returns, its side of the rotation channel is gone and the checkpoint
    /// worker drains and stops on its own. Worker errors are aggregated and returned
    /// together. If the processor was never started this returns immediately.
    pub async fn wait(self) -> RowsyncResult<()> {
        let ProcessorState::Started {
            consumer_worker,
            checkpoint_worker,
        } = self.state
        else {
            info!("processor was not started, nothing to wait for");

            return Ok(());
        };

        info!("waiting for consumer worker to complete");

        let mut errors = vec![];

        if let Err(err) = consumer_worker.wait().await {
            errors.push(err);

            info!("consumer worker completed with an error");
        }

        info!("waiting for checkpoint worker to complete");

        if let Err(err) = checkpoint_worker.wait().await {
            errors.push(err);

            info!("checkpoint worker completed with an error");
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        Ok(())
    }

    /// Initiates graceful shutdown of the processor.
    ///
    /// Sends the shutdown signal and returns immediately; use [`Processor::wait`]
    /// to wait for the workers to actually stop.
    pub fn shutdown(&self) {
        info!("trying to shut down the processor");

        if let Err(err) = self.shutdown_tx.shutdown() {
            error!(error = %err, "failed to send shutdown signal to the processor");

            return;
        }

        info!("shutdown signal successfully sent to all workers");
    }

    /// Initiates shutdown and waits for complete termination.
    pub async fn shutdown_and_wait(self) -> RowsyncResult<()> {
        self.shutdown();
        self.wait().await
    }

    /// Returns the position streaming should start from.
    ///
    /// With resumption enabled and a stored checkpoint present, streaming restarts
    /// at the beginning of the stored segment; row events between the segment start
    /// and the crash point are replayed (at-least-once delivery). Otherwise the
    /// configured position is used as given.
    async fn resolve_start_position(&self) -> StreamPosition {
        if !self.resume_from_checkpoint {
            return self.start_position.clone();
        }

        match self.checkpoint_store.load().await {
            Some(segment) => {
                info!(segment = %segment, "resuming from the last checkpointed segment");

                StreamPosition::segment_start(segment)
            }
            None => {
                info!("no usable checkpoint found, using the configured start position");

                self.start_position.clone()
            }
        }
    }
}
