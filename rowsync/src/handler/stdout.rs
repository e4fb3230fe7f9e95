use async_trait::async_trait;

use crate::error::RowsyncResult;
use crate::handler::base::Handler;
use crate::types::ChangeRecord;

/// A [`Handler`] that prints each record to stdout as one JSON line.
#[derive(Debug, Clone, Default)]
pub struct StdoutHandler;

impl StdoutHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for StdoutHandler {
    async fn deliver(&self, record: &ChangeRecord) -> RowsyncResult<()> {
        let line = serde_json::to_string(record)?;
        println!("{line}");

        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
