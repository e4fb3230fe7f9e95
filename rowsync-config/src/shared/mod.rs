mod base;
mod checkpoint;
mod connection;
mod handler;
mod relay;
mod source;

pub use base::*;
pub use checkpoint::*;
pub use connection::*;
pub use handler::*;
pub use relay::*;
pub use source::*;
