use serde::Serialize;
use std::fmt;

use crate::types::{ScalarValue, TableName};

/// The kind of row change carried by a [`RowMutationEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Insert => write!(f, "insert"),
            ActionKind::Update => write!(f, "update"),
            ActionKind::Delete => write!(f, "delete"),
        }
    }
}

/// A decoded insert, update, or delete affecting one row.
///
/// [`RowMutationEvent`] carries raw positional column values; names are attached later
/// by enrichment against the cached table schema. For updates, [`values`] holds the
/// after image and [`old_values`] the before image. Enrichment only ever reads the
/// after image; the before image is carried for completeness and discarded downstream.
///
/// [`values`]: RowMutationEvent::values
/// [`old_values`]: RowMutationEvent::old_values
#[derive(Debug, Clone, PartialEq)]
pub struct RowMutationEvent {
    /// The table the row belongs to.
    pub table: TableName,
    /// The kind of change.
    pub action: ActionKind,
    /// Row values after the change, in physical column order.
    pub values: Vec<ScalarValue>,
    /// Row values before an update. [`None`] for inserts and deletes.
    pub old_values: Option<Vec<ScalarValue>>,
}

/// A marker that the upstream stream moved to a new log segment.
///
/// The transport also emits rotation markers when renegotiating an existing stream;
/// those carry a non-zero [`log_pos`] and must not be treated as segment boundaries.
/// Only a rotation whose header position is the start-of-segment sentinel (0) is a
/// genuine boundary.
///
/// [`log_pos`]: RotationEvent::log_pos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationEvent {
    /// Name of the segment the stream rotated into.
    pub next_segment: String,
    /// Position reported by the event header; 0 marks a genuine boundary.
    pub log_pos: u64,
}

impl RotationEvent {
    /// Returns whether this rotation is a genuine segment boundary rather than a
    /// renegotiation echo.
    pub fn is_segment_boundary(&self) -> bool {
        self.log_pos == 0
    }
}

/// A single decoded event from the upstream stream.
///
/// The relay matches this exhaustively: row mutations are enriched and fanned out,
/// rotations drive checkpointing, and everything else the transport decodes (format
/// descriptors, transaction markers, heartbeats) is [`Event::Other`] and ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RowMutation(RowMutationEvent),
    Rotation(RotationEvent),
    Other,
}
