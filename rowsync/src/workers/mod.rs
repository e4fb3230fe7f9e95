//! Long-running worker tasks and their lifecycles.

pub mod base;
pub mod checkpoint;
pub mod consumer;
