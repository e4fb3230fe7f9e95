//! Conversions from raw decoded rows into sink-ready records.

mod record;
#[cfg(feature = "mysql")]
pub(crate) mod value;

pub use record::*;
