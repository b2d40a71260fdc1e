//! Identity model: ids, addresses and entity levels.

mod address;
mod id;

pub use address::{Address, Level};
pub use id::Id;
