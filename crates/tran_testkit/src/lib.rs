//! # tran testkit
//!
//! Test utilities for tran.
//!
//! This crate provides:
//! - Call recorders and sentinel signals
//! - Property-based test generators using proptest
//! - Concurrent commit race harness
//! - Test log setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tran_testkit::prelude::*;
//!
//! #[test]
//! fn runs_in_order() {
//!     let recorder = CallRecorder::new();
//!     let mut txn = Transaction::new();
//!     txn.push(recorder.callable("a"), args![])?;
//!     txn.commit()?;
//!     assert_eq!(recorder.names(), ["a"]);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::stress::*;
    pub use tran_core::{args, kwargs, Transaction};
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
pub use stress::*;
