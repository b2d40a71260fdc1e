//! # revtree testkit
//!
//! Test utilities for revtree.
//!
//! This crate provides:
//! - Fixtures: the phonebook model, its command history and sync log
//! - Property-based test generators using proptest
//! - Temporary sync log files for CLI tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use revtree_testkit::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn commands_never_panic(model in model_strategy(3), command in command_strategy(3)) {
//!         let _ = revtree_core::commit(Some(&model), &model_address(), &command, &id("tester"));
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use proptest::prelude::*;
}

pub use fixtures::*;
pub use generators::*;
