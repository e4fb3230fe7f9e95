//! Sink handlers and record fan-out.

mod base;
mod fanout;
mod memory;
mod stdout;

pub use base::*;
pub use fanout::*;
pub use memory::*;
pub use stdout::*;
