use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{ActionKind, ScalarValue};

/// One enriched, sink-ready change.
///
/// [`ChangeRecord`] is what handlers receive: the table identity, the action kind, and
/// a column-name-to-value mapping built by zipping the cached schema against the raw
/// row. A null column is present in `data` with an explicit null value, never absent.
/// Records are created per row event, handed to the sinks, and not retained.
///
/// The serialized form uses the keys `schema`, `table`, `type`, and `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    /// The database (schema) the change happened in.
    pub schema: String,
    /// The table the change happened in.
    pub table: String,
    /// The kind of change.
    #[serde(rename = "type")]
    pub action: ActionKind,
    /// Column name to value mapping for the row's current image.
    pub data: BTreeMap<String, ScalarValue>,
}
