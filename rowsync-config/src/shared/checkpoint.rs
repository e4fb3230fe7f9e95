use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration for durable checkpoint storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckpointConfig {
    /// Directory the checkpoint log is kept in.
    ///
    /// Created on startup if it does not exist. Must live on the same filesystem
    /// for the whole relay lifetime since saves rename within it.
    pub directory: String,
}

impl CheckpointConfig {
    /// Validates checkpoint configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.directory.is_empty() {
            return Err(ValidationError::CheckpointDirectoryEmpty);
        }

        Ok(())
    }
}
