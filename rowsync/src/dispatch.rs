use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::conversions::enrich_row;
use crate::handler::HandlerFanout;
use crate::metadata::MetadataProvider;
use crate::schema::SchemaCache;
use crate::types::{Event, RotationEvent, RowMutationEvent};

/// Routes each decoded stream event to row enrichment or checkpoint signaling.
///
/// The dispatcher owns the in-memory notion of the segment the stream is currently
/// in; it is the only writer of that state. Genuine segment boundaries are forwarded
/// to the checkpoint worker over `rotation_tx`.
pub struct EventDispatcher<M> {
    schema_cache: SchemaCache<M>,
    fanout: HandlerFanout,
    rotation_tx: mpsc::Sender<String>,
    current_segment: Option<String>,
}

impl<M> EventDispatcher<M>
where
    M: MetadataProvider,
{
    pub fn new(
        schema_cache: SchemaCache<M>,
        fanout: HandlerFanout,
        rotation_tx: mpsc::Sender<String>,
    ) -> Self {
        Self {
            schema_cache,
            fanout,
            rotation_tx,
            current_segment: None,
        }
    }

    /// Returns the segment the stream last rotated into, if any rotation was seen.
    pub fn current_segment(&self) -> Option<&str> {
        self.current_segment.as_deref()
    }

    /// Handles one decoded event.
    ///
    /// Row mutations that cannot be enriched are dropped with an error log; the
    /// stream must keep flowing, so nothing here is fatal to the caller.
    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::RowMutation(row_mutation) => self.handle_row_mutation(row_mutation).await,
            Event::Rotation(rotation) => self.handle_rotation(rotation).await,
            // Transaction markers, format descriptors and other bookkeeping events
            // carry nothing the relay forwards.
            Event::Other => {}
        }
    }

    async fn handle_row_mutation(&mut self, event: RowMutationEvent) {
        let table_schema = match self.schema_cache.resolve(&event.table).await {
            Ok(table_schema) => table_schema,
            Err(err) => {
                error!(
                    table = %event.table,
                    error = %err,
                    "failed to resolve the table schema, dropping event"
                );

                return;
            }
        };

        let record = match enrich_row(&event, &table_schema) {
            Ok(record) => record,
            Err(err) => {
                error!(
                    table = %event.table,
                    error = %err,
                    "failed to enrich the row mutation, dropping event"
                );

                return;
            }
        };

        self.fanout.dispatch(&record).await;
    }

    async fn handle_rotation(&mut self, rotation: RotationEvent) {
        if !rotation.is_segment_boundary() {
            debug!(
                segment = %rotation.next_segment,
                log_pos = rotation.log_pos,
                "ignoring stream renegotiation echo"
            );

            return;
        }

        info!(
            from = ?self.current_segment,
            to = %rotation.next_segment,
            "stream rotated into a new segment"
        );
        self.current_segment = Some(rotation.next_segment.clone());

        // A closed channel means the checkpoint worker is gone; durable position
        // stops advancing but consumption keeps going.
        if self.rotation_tx.send(rotation.next_segment).await.is_err() {
            warn!("checkpoint worker is not listening, dropping segment signal");
        }
    }
}
