use serde::{Deserialize, Serialize};

use crate::shared::{MySqlConnectionConfig, ValidationError};

/// Configuration for the upstream binlog source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// The connection configuration for the MySQL instance the relay follows.
    pub connection: MySqlConnectionConfig,
    /// Server id the relay registers with when joining replication.
    ///
    /// Must be non-zero and unique among all replicas of the source server.
    pub server_id: u32,
    /// Binlog segment streaming starts from when no checkpoint is available.
    pub start_segment: String,
    /// Offset within the starting segment.
    ///
    /// The first event in a segment sits after the 4-byte magic header.
    pub start_offset: u32,
    /// Whether to resume from the last checkpointed segment instead of the
    /// configured start position, when a checkpoint exists.
    pub resume_from_checkpoint: bool,
}

impl SourceConfig {
    /// Validates source configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.server_id == 0 {
            return Err(ValidationError::ServerIdZero);
        }

        if self.start_segment.is_empty() {
            return Err(ValidationError::StartSegmentEmpty);
        }

        Ok(())
    }
}
