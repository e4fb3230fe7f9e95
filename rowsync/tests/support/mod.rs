//! Shared helpers for relay integration tests.
//!
//! Provides a channel-fed event source so tests can drive a running processor one
//! event at a time, builders for the decoded event shapes, and small waiting
//! utilities for observing asynchronous delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, sleep};

use rowsync::error::{ErrorKind, RowsyncResult};
use rowsync::handler::{Handler, MemoryHandler};
use rowsync::metadata::MemoryMetadataProvider;
use rowsync::rowsync_error;
use rowsync::source::{EventSource, EventStream};
use rowsync::types::{
    ActionKind, ChangeRecord, Event, RotationEvent, RowMutationEvent, ScalarValue, StreamPosition,
    TableName,
};

#[derive(Debug)]
struct ChannelSourceInner {
    events_rx: Option<mpsc::Receiver<Event>>,
}

/// An [`EventSource`] fed live through a channel.
///
/// The stream stays open until the feeding side is dropped, so tests can hold a
/// processor mid-stream and observe blocking and shutdown behavior.
#[derive(Debug, Clone)]
pub struct ChannelSource {
    inner: Arc<Mutex<ChannelSourceInner>>,
}

impl ChannelSource {
    pub fn new() -> (Self, mpsc::Sender<Event>) {
        let (events_tx, events_rx) = mpsc::channel(64);

        let inner = ChannelSourceInner {
            events_rx: Some(events_rx),
        };
        let source = Self {
            inner: Arc::new(Mutex::new(inner)),
        };

        (source, events_tx)
    }
}

impl EventSource for ChannelSource {
    type Stream = ChannelStream;

    async fn connect(&self, _position: StreamPosition) -> RowsyncResult<Self::Stream> {
        let mut inner = self.inner.lock().await;

        let events_rx = inner.events_rx.take().ok_or_else(|| {
            rowsync_error!(
                ErrorKind::InvalidState,
                "Channel source was already connected"
            )
        })?;

        Ok(ChannelStream { events_rx })
    }
}

/// The stream side of a [`ChannelSource`].
#[derive(Debug)]
pub struct ChannelStream {
    events_rx: mpsc::Receiver<Event>,
}

impl EventStream for ChannelStream {
    async fn next_event(&mut self) -> RowsyncResult<Option<Event>> {
        Ok(self.events_rx.recv().await)
    }
}

/// A [`Handler`] that rejects every record it is given.
#[derive(Debug, Clone, Default)]
pub struct FailingHandler;

#[async_trait]
impl Handler for FailingHandler {
    async fn deliver(&self, _record: &ChangeRecord) -> RowsyncResult<()> {
        Err(rowsync_error!(
            ErrorKind::HandlerFailed,
            "This handler always fails"
        ))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Returns a metadata provider knowing the `shop.orders` table.
pub async fn orders_metadata() -> MemoryMetadataProvider {
    let metadata = MemoryMetadataProvider::new();
    metadata
        .add_table(
            orders_table(),
            vec!["id".to_owned(), "name".to_owned(), "note".to_owned()],
        )
        .await;

    metadata
}

pub fn orders_table() -> TableName {
    TableName::new("shop", "orders")
}

/// Builds an insert against `shop.orders` with the (id, name, note) column layout.
pub fn orders_insert(id: i64, name: &str, note: Option<&str>) -> Event {
    let note = match note {
        Some(note) => ScalarValue::from(note),
        None => ScalarValue::Null,
    };

    Event::RowMutation(RowMutationEvent {
        table: orders_table(),
        action: ActionKind::Insert,
        values: vec![ScalarValue::Int(id), ScalarValue::from(name), note],
        old_values: None,
    })
}

/// Builds a genuine segment boundary rotation into `segment`.
pub fn rotation_boundary(segment: &str) -> Event {
    Event::Rotation(RotationEvent {
        next_segment: segment.to_owned(),
        log_pos: 0,
    })
}

/// Builds a renegotiation echo rotation, which the relay must ignore.
pub fn rotation_echo(segment: &str, log_pos: u64) -> Event {
    Event::Rotation(RotationEvent {
        next_segment: segment.to_owned(),
        log_pos,
    })
}

/// Polls the handler until it has seen `count` records, returning them.
///
/// Panics if the count is not reached within a few seconds.
pub async fn wait_for_record_count(handler: &MemoryHandler, count: usize) -> Vec<ChangeRecord> {
    let deadline = Instant::now() + Duration::from_secs(5);

    loop {
        let records = handler.records().await;
        if records.len() >= count {
            return records;
        }

        if Instant::now() >= deadline {
            panic!(
                "timed out waiting for {count} records, saw only {}",
                records.len()
            );
        }

        sleep(Duration::from_millis(10)).await;
    }
}
