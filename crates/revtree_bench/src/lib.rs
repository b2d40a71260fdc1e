//! Shared fixtures for the revtree benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;

pub use utils::*;
