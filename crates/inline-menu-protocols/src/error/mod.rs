//! Error types for the inline menu protocol layer.

mod frame;
mod protocol;
mod provider;

pub use frame::*;
pub use protocol::*;
pub use provider::*;
