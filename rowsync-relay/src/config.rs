use rowsync_config::load_config;
use rowsync_config::shared::RelayConfig;

/// Loads the [`RelayConfig`] and validates it.
pub fn load_relay_config() -> anyhow::Result<RelayConfig> {
    let config = load_config::<RelayConfig>()?;
    config.validate()?;

    Ok(config)
}
