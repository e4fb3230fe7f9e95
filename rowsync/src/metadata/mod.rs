//! Column metadata lookup for cache misses.

mod base;
mod memory;
#[cfg(feature = "mysql")]
mod mysql;

pub use base::*;
pub use memory::*;
#[cfg(feature = "mysql")]
pub use mysql::*;
