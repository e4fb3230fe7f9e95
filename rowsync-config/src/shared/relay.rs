use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{CheckpointConfig, HandlerConfig, SourceConfig, ValidationError};

/// Complete configuration for the relay service.
///
/// Aggregates all configuration required to run the relay: the upstream source,
/// durable checkpoint storage, and the ordered handler list. Typically loaded from
/// configuration files at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RelayConfig {
    /// Configuration for the upstream binlog source.
    pub source: SourceConfig,
    /// Configuration for durable checkpoint storage.
    pub checkpoint: CheckpointConfig,
    /// Sink handlers, in delivery order.
    pub handlers: Vec<HandlerConfig>,
}

impl RelayConfig {
    /// Validates the complete relay configuration.
    ///
    /// Performs comprehensive validation of all configuration components.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.checkpoint.validate()?;

        if self.handlers.is_empty() {
            return Err(ValidationError::NoHandlers);
        }

        Ok(())
    }
}

impl Config for RelayConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_valid_config() -> RelayConfig {
        RelayConfig {
            source: SourceConfig {
                connection: crate::shared::MySqlConnectionConfig {
                    host: "localhost".to_owned(),
                    port: 3306,
                    username: "relay".to_owned(),
                    password: None,
                },
                server_id: 1001,
                start_segment: "binlog.000001".to_owned(),
                start_offset: 4,
                resume_from_checkpoint: true,
            },
            checkpoint: CheckpointConfig {
                directory: "/var/lib/rowsync".to_owned(),
            },
            handlers: vec![HandlerConfig::Stdout],
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(a_valid_config().validate().is_ok());
    }

    #[test]
    fn test_zero_server_id_is_rejected() {
        let mut config = a_valid_config();
        config.source.server_id = 0;

        assert!(matches!(
            config.validate(),
            Err(ValidationError::ServerIdZero)
        ));
    }

    #[test]
    fn test_empty_start_segment_is_rejected() {
        let mut config = a_valid_config();
        config.source.start_segment = String::new();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::StartSegmentEmpty)
        ));
    }

    #[test]
    fn test_empty_checkpoint_directory_is_rejected() {
        let mut config = a_valid_config();
        config.checkpoint.directory = String::new();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::CheckpointDirectoryEmpty)
        ));
    }

    #[test]
    fn test_empty_handler_list_is_rejected() {
        let mut config = a_valid_config();
        config.handlers.clear();

        assert!(matches!(config.validate(), Err(ValidationError::NoHandlers)));
    }

    #[test]
    fn test_handlers_deserialize_from_plain_names() {
        let yaml = r#"
source:
  connection:
    host: localhost
    port: 3306
    username: relay
  server_id: 1001
  start_segment: binlog.000001
  start_offset: 4
  resume_from_checkpoint: true
checkpoint:
  directory: /var/lib/rowsync
handlers:
  - memory
  - stdout
"#;

        let config: RelayConfig = serde_yaml_from_str(yaml);
        assert_eq!(config.handlers.len(), 2);
        assert!(matches!(config.handlers[0], HandlerConfig::Memory));
        assert!(matches!(config.handlers[1], HandlerConfig::Stdout));
    }

    // The config crate is the only YAML parser in the dependency tree, so tests go
    // through it rather than pulling in a second one.
    fn serde_yaml_from_str(yaml: &str) -> RelayConfig {
        let source = config::File::from_str(yaml, config::FileFormat::Yaml);
        config::Config::builder()
            .add_source(source)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
