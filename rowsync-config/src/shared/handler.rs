use serde::{Deserialize, Serialize};

/// Configuration for supported sink handlers.
///
/// Each variant corresponds to a different handler implementation. Handlers receive
/// enriched change records sequentially, in the order they are configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerConfig {
    /// In-memory handler for ephemeral or test data.
    Memory,
    /// Prints each record as a JSON line on standard output.
    Stdout,
}
