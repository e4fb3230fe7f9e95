//! Durable stream position tracking.

mod store;

pub use store::*;
