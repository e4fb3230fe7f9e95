pub mod checkpoint;
pub mod concurrency;
pub mod conversions;
pub mod dispatch;
pub mod error;
pub mod handler;
mod macros;
pub mod metadata;
pub mod processor;
pub mod schema;
pub mod source;
pub mod types;
pub mod workers;
