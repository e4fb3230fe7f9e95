use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The replication server id cannot be zero.
    #[error("`server_id` cannot be zero; the source server reserves id 0")]
    ServerIdZero,
    /// The starting segment cannot be empty.
    #[error("`start_segment` cannot be empty")]
    StartSegmentEmpty,
    /// The checkpoint directory cannot be empty.
    #[error("`checkpoint.directory` cannot be empty")]
    CheckpointDirectoryEmpty,
    /// At least one handler must be configured.
    #[error("`handlers` cannot be empty; records would have nowhere to go")]
    NoHandlers,
}
