//! Table schema caching.

mod cache;

pub use cache::*;
