use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{ErrorKind, RowsyncResult};
use crate::rowsync_error;
use crate::source::base::{EventSource, EventStream};
use crate::types::{Event, StreamPosition};

#[derive(Debug)]
struct Inner {
    events: Option<VecDeque<Event>>,
    connected_at: Option<StreamPosition>,
}

/// An [`EventSource`] replaying a scripted list of events.
///
/// The stream yields the events in order and then reports a clean close. Useful for
/// demos and tests; the position the stream was opened at can be inspected afterwards.
#[derive(Debug, Clone)]
pub struct MemorySource {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySource {
    pub fn new(events: Vec<Event>) -> Self {
        let inner = Inner {
            events: Some(events.into()),
            connected_at: None,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Returns the position `connect` was called with, if it was.
    pub async fn connected_at(&self) -> Option<StreamPosition> {
        let inner = self.inner.lock().await;
        inner.connected_at.clone()
    }
}

impl EventSource for MemorySource {
    type Stream = MemoryStream;

    async fn connect(&self, position: StreamPosition) -> RowsyncResult<Self::Stream> {
        let mut inner = self.inner.lock().await;
        inner.connected_at = Some(position);

        let events = inner.events.take().ok_or_else(|| {
            rowsync_error!(
                ErrorKind::InvalidState,
                "Memory source was already connected"
            )
        })?;

        Ok(MemoryStream { events })
    }
}

/// The stream side of a [`MemorySource`].
#[derive(Debug)]
pub struct MemoryStream {
    events: VecDeque<Event>,
}

impl EventStream for MemoryStream {
    async fn next_event(&mut self) -> RowsyncResult<Option<Event>> {
        Ok(self.events.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_events_then_closes() {
        let source = MemorySource::new(vec![Event::Other, Event::Other]);
        let mut stream = source
            .connect(StreamPosition::new("binlog.000001", 4))
            .await
            .unwrap();

        assert_eq!(stream.next_event().await.unwrap(), Some(Event::Other));
        assert_eq!(stream.next_event().await.unwrap(), Some(Event::Other));
        assert_eq!(stream.next_event().await.unwrap(), None);
        assert_eq!(
            source.connected_at().await,
            Some(StreamPosition::new("binlog.000001", 4))
        );
    }

    #[tokio::test]
    async fn test_second_connect_fails() {
        let source = MemorySource::new(vec![]);
        source
            .connect(StreamPosition::segment_start("binlog.000001"))
            .await
            .unwrap();

        let result = source
            .connect(StreamPosition::segment_start("binlog.000001"))
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidState);
    }
}
