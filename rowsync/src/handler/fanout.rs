use tracing::error;

use crate::handler::base::Handler;
use crate::types::ChangeRecord;

/// Delivers each change record to every registered handler.
///
/// Handlers run sequentially in registration order. Failures are logged per handler
/// and never stop delivery to the handlers after it; this is deliberate best-effort
/// independent delivery, not a transaction.
pub struct HandlerFanout {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerFanout {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Hands `record` to every handler in registration order.
    pub async fn dispatch(&self, record: &ChangeRecord) {
        for handler in &self.handlers {
            if let Err(err) = handler.deliver(record).await {
                error!(
                    handler = handler.name(),
                    schema = %record.schema,
                    table = %record.table,
                    error = %err,
                    "handler failed to deliver a change record"
                );
            }
        }
    }
}
