use mysql_async::{Opts, OptsBuilder, Pool};
use rowsync::checkpoint::CheckpointStore;
use rowsync::handler::{Handler, MemoryHandler, StdoutHandler};
use rowsync::metadata::{MetadataProvider, MySqlMetadataProvider};
use rowsync::processor::Processor;
use rowsync::source::{EventSource, MySqlEventSource};
use rowsync::types::StreamPosition;
use rowsync_config::shared::{
    CheckpointConfig, HandlerConfig, MySqlConnectionConfig, RelayConfig, SourceConfig,
};
use secrecy::ExposeSecret;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};

/// Starts the relay service with the provided configuration.
///
/// Builds the MySQL source and metadata provider, instantiates the configured
/// handlers and the checkpoint store, and runs the processor until it completes
/// or a shutdown signal arrives.
pub async fn start_relay_with_config(relay_config: RelayConfig) -> anyhow::Result<()> {
    info!("starting relay service");

    log_config(&relay_config);

    let opts = connection_opts(&relay_config.source.connection);

    // The metadata pool is separate from the replication connection, so column
    // lookups never interfere with the binlog stream.
    let metadata = MySqlMetadataProvider::new(Pool::new(opts.clone()));
    let source = MySqlEventSource::new(opts, relay_config.source.server_id);

    let handlers = build_handlers(&relay_config.handlers);

    let checkpoint_store = CheckpointStore::new(&relay_config.checkpoint.directory).await?;

    let start_position = StreamPosition::new(
        relay_config.source.start_segment.clone(),
        relay_config.source.start_offset,
    );

    let processor = Processor::new(
        source,
        metadata,
        handlers,
        checkpoint_store,
        start_position,
        relay_config.source.resume_from_checkpoint,
    );
    start_processor(processor).await?;

    info!("relay service completed");

    Ok(())
}

fn log_config(config: &RelayConfig) {
    log_source_config(&config.source);
    log_checkpoint_config(&config.checkpoint);
    log_handlers_config(&config.handlers);
}

fn log_source_config(config: &SourceConfig) {
    debug!(
        host = config.connection.host,
        port = config.connection.port,
        username = config.connection.username,
        server_id = config.server_id,
        start_segment = config.start_segment,
        start_offset = config.start_offset,
        resume_from_checkpoint = config.resume_from_checkpoint,
        "source config"
    );
}

fn log_checkpoint_config(config: &CheckpointConfig) {
    debug!(directory = config.directory, "checkpoint config");
}

fn log_handlers_config(configs: &[HandlerConfig]) {
    debug!(handlers = ?configs, "handlers config");
}

/// Builds MySQL connection options from the connection configuration.
fn connection_opts(config: &MySqlConnectionConfig) -> Opts {
    let mut builder = OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.username.clone()));

    if let Some(password) = &config.password {
        builder = builder.pass(Some(password.expose_secret().to_owned()));
    }

    builder.into()
}

/// Instantiates the configured sink handlers, preserving their order.
fn build_handlers(configs: &[HandlerConfig]) -> Vec<Box<dyn Handler>> {
    configs
        .iter()
        .map(|config| match config {
            HandlerConfig::Memory => Box::new(MemoryHandler::new()) as Box<dyn Handler>,
            HandlerConfig::Stdout => Box::new(StdoutHandler::new()) as Box<dyn Handler>,
        })
        .collect()
}

/// Starts a processor and handles graceful shutdown signals.
///
/// Launches the processor, sets up signal handlers for SIGTERM and SIGINT,
/// and ensures proper cleanup on shutdown. The processor will finish handling
/// the event in flight before terminating.
#[tracing::instrument(skip(processor))]
async fn start_processor<S, M>(mut processor: Processor<S, M>) -> anyhow::Result<()>
where
    S: EventSource + 'static,
    M: MetadataProvider + Send + Sync + 'static,
{
    // Start the processor.
    processor.start().await?;

    // Spawn a task to listen for shutdown signals and trigger shutdown.
    let shutdown_tx = processor.shutdown_tx();
    let shutdown_handle = tokio::spawn(async move {
        // Listen for SIGTERM, sent by Kubernetes before SIGKILL during pod termination.
        //
        // If the process is killed before shutdown completes, the checkpoint log stays
        // valid; at worst the relay replays the resumed segment on the next start.
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT (Ctrl+C) received, shutting down relay");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down relay");
            }
        }

        if let Err(e) = shutdown_tx.shutdown() {
            warn!("failed to send shutdown signal: {:?}", e);
            return;
        }

        info!("relay shutdown successfully")
    });

    // Wait for the processor to finish (either normally or via shutdown).
    let result = processor.wait().await;

    // Ensure the shutdown task is finished before returning.
    // If the processor finished before Ctrl+C, we want to abort the shutdown task.
    // If Ctrl+C was pressed, the shutdown task will have already triggered shutdown.
    // We don't care about the result of the shutdown_handle, but we should abort it if it's still running.
    shutdown_handle.abort();
    let _ = shutdown_handle.await;

    // Propagate any processor error as anyhow error.
    result?;

    Ok(())
}
