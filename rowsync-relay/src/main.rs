use crate::config::load_relay_config;
use crate::core::start_relay_with_config;
use rowsync_config::shared::RelayConfig;
use rowsync_telemetry::init_tracing;
use tracing::error;

mod config;
mod core;

fn main() -> anyhow::Result<()> {
    // Load relay config
    let relay_config = load_relay_config()?;

    // Initialize tracing
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    // We start the runtime.
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(relay_config))?;

    Ok(())
}

async fn async_main(relay_config: RelayConfig) -> anyhow::Result<()> {
    // We start the relay and catch any errors.
    if let Err(err) = start_relay_with_config(relay_config).await {
        error!("an error occurred in the relay: {err}");

        return Err(err);
    }

    Ok(())
}
