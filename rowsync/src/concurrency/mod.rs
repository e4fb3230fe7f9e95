//! Concurrency primitives shared by the relay workers.

pub mod shutdown;
