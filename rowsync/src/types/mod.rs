//! Common types used throughout the relay.
//!
//! Re-exports the decoded event model, the enriched record shape, table identity and
//! schema types, scalar values, and stream positions used across the pipeline.

mod event;
mod position;
mod record;
mod table;
mod value;

pub use event::*;
pub use position::*;
pub use record::*;
pub use table::*;
pub use value::*;
