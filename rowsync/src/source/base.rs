use std::future::Future;

use crate::error::RowsyncResult;
use crate::types::{Event, StreamPosition};

/// An open, ordered stream of decoded events.
pub trait EventStream: Send {
    /// Returns the next decoded event.
    ///
    /// Suspends until the transport delivers one. `Ok(None)` means the transport
    /// closed the stream cleanly; transport failures surface as errors and are fatal
    /// to the consumer.
    fn next_event(&mut self) -> impl Future<Output = RowsyncResult<Option<Event>>> + Send;
}

/// An upstream transport that can open a decoded event stream.
///
/// Implementations authenticate against the source and start streaming at the given
/// position. The relay consumes whatever the stream yields; it never touches the wire
/// format itself.
pub trait EventSource {
    type Stream: EventStream + 'static;

    /// Opens the stream at `position`.
    fn connect(
        &self,
        position: StreamPosition,
    ) -> impl Future<Output = RowsyncResult<Self::Stream>> + Send;
}
