//! Upstream transports producing decoded stream events.

mod base;
mod memory;
#[cfg(feature = "mysql")]
mod mysql;

pub use base::*;
pub use memory::*;
#[cfg(feature = "mysql")]
pub use mysql::*;
