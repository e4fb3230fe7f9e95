use std::collections::VecDeque;
use std::io;

use futures::StreamExt;
use mysql_async::binlog::events::{Event as BinlogEvent, EventData, RowsEventData};
use mysql_async::binlog::row::BinlogRow;
use mysql_async::{BinlogStream, BinlogStreamRequest, Conn, Opts};
use tracing::{error, info};

use crate::conversions::value::scalars_from_row;
use crate::error::{ErrorKind, RowsyncResult};
use crate::source::base::{EventSource, EventStream};
use crate::types::{
    ActionKind, Event, RotationEvent, RowMutationEvent, ScalarValue, StreamPosition, TableName,
};
use crate::{bail, rowsync_error};

/// An [`EventSource`] that registers as a replica against a MySQL primary and
/// follows its binlog.
///
/// Connecting opens a dedicated replication connection, so the source can be
/// built once and connected independently of any query pool.
#[derive(Debug, Clone)]
pub struct MySqlEventSource {
    opts: Opts,
    server_id: u32,
}

impl MySqlEventSource {
    /// Creates a new source that will identify itself with `server_id` when it
    /// registers as a replica.
    pub fn new(opts: Opts, server_id: u32) -> Self {
        Self { opts, server_id }
    }
}

impl EventSource for MySqlEventSource {
    type Stream = MySqlEventStream;

    async fn connect(&self, position: StreamPosition) -> RowsyncResult<Self::Stream> {
        let conn = Conn::new(self.opts.clone()).await.map_err(|err| {
            rowsync_error!(
                ErrorKind::SourceConnectionFailed,
                "Failed to connect to the MySQL source",
                err
            )
        })?;

        let request = BinlogStreamRequest::new(self.server_id)
            .with_filename(position.segment.as_bytes())
            .with_pos(u64::from(position.offset));
        let stream = conn.get_binlog_stream(request).await.map_err(|err| {
            rowsync_error!(
                ErrorKind::SourceConnectionFailed,
                "Failed to open the binlog stream",
                err
            )
        })?;

        info!(position = %position, server_id = self.server_id, "binlog stream opened");

        Ok(MySqlEventStream {
            stream,
            pending: VecDeque::new(),
        })
    }
}

/// The live binlog stream produced by [`MySqlEventSource::connect`].
///
/// One binlog event can carry several rows, so decoded events are buffered in
/// `pending` and handed out one at a time.
pub struct MySqlEventStream {
    stream: BinlogStream,
    pending: VecDeque<Event>,
}

impl EventStream for MySqlEventStream {
    async fn next_event(&mut self) -> RowsyncResult<Option<Event>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            match self.stream.next().await {
                Some(Ok(event)) => self.decode(event)?,
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(None),
            }
        }
    }
}

impl MySqlEventStream {
    fn decode(&mut self, event: BinlogEvent) -> RowsyncResult<()> {
        let log_pos = u64::from(event.header().log_pos());
        let data = match event.read_data() {
            Ok(data) => data,
            Err(err) => bail!(
                ErrorKind::SourceStreamFailed,
                "Failed to decode a binlog event",
                err
            ),
        };

        match data {
            Some(EventData::RotateEvent(rotate)) => {
                self.pending.push_back(Event::Rotation(RotationEvent {
                    next_segment: rotate.name().into_owned(),
                    log_pos,
                }));
            }
            Some(EventData::RowsEvent(rows_event)) => self.decode_rows(rows_event)?,
            // Format descriptions, transaction markers and everything else the
            // relay does not interpret still tick the stream over.
            _ => self.pending.push_back(Event::Other),
        }

        Ok(())
    }

    fn decode_rows(&mut self, rows_event: RowsEventData<'_>) -> RowsyncResult<()> {
        let action = match &rows_event {
            RowsEventData::WriteRowsEvent(_) | RowsEventData::WriteRowsEventV1(_) => {
                ActionKind::Insert
            }
            RowsEventData::UpdateRowsEvent(_)
            | RowsEventData::UpdateRowsEventV1(_)
            | RowsEventData::PartialUpdateRowsEvent(_) => ActionKind::Update,
            RowsEventData::DeleteRowsEvent(_) | RowsEventData::DeleteRowsEventV1(_) => {
                ActionKind::Delete
            }
        };

        let Some(tme) = self.stream.get_tme(rows_event.table_id()) else {
            bail!(
                ErrorKind::SourceStreamFailed,
                "Row event arrived without a preceding table map event",
                rows_event.table_id()
            );
        };
        let table = TableName::new(
            tme.database_name().into_owned(),
            tme.table_name().into_owned(),
        );

        decode_row_images(&mut self.pending, &table, action, rows_event.rows(tme))
    }
}

/// Decodes the rows carried by one binlog rows event into pending stream events.
///
/// Row-parse failures are fatal: the stream itself can no longer be trusted. A value
/// the relay cannot convert spoils only the row that carries it, so that row is
/// dropped with an error log and decoding continues with the next one.
fn decode_row_images(
    pending: &mut VecDeque<Event>,
    table: &TableName,
    action: ActionKind,
    rows: impl Iterator<Item = io::Result<(Option<BinlogRow>, Option<BinlogRow>)>>,
) -> RowsyncResult<()> {
    for row in rows {
        let (before, after) = match row {
            Ok(images) => images,
            Err(err) => bail!(
                ErrorKind::SourceStreamFailed,
                "Failed to decode a binlog row",
                err
            ),
        };

        // Inserts and deletes carry a single image, updates carry both.
        let (image, old_image) = match action {
            ActionKind::Insert => (after, None),
            ActionKind::Update => (after, before),
            ActionKind::Delete => (before, None),
        };
        let Some(image) = image else {
            bail!(
                ErrorKind::SourceStreamFailed,
                "Row event is missing its row image",
                table
            );
        };

        let (values, old_values) = match convert_images(&image, old_image.as_ref()) {
            Ok(converted) => converted,
            Err(err) => {
                error!(
                    table = %table,
                    error = %err,
                    "failed to convert a binlog row, dropping the row"
                );

                continue;
            }
        };

        pending.push_back(Event::RowMutation(RowMutationEvent {
            table: table.clone(),
            action,
            values,
            old_values,
        }));
    }

    Ok(())
}

fn convert_images(
    image: &BinlogRow,
    old_image: Option<&BinlogRow>,
) -> RowsyncResult<(Vec<ScalarValue>, Option<Vec<ScalarValue>>)> {
    let values = scalars_from_row(image)?;
    let old_values = old_image.map(scalars_from_row).transpose()?;

    Ok((values, old_values))
}
