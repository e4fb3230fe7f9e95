//! Configuration management for the rowsync relay.
//!
//! Provides environment detection, configuration loading from YAML files,
//! secret handling, and shared configuration types for the relay service.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::*;
pub use load::*;
pub use secret::*;
