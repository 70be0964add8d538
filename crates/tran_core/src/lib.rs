//! # tran core
//!
//! Deferred execution of function calls, loosely modelled on a database
//! transaction.
//!
//! This crate provides:
//! - `Transaction`, a queue of calls executed once by `commit`
//! - Optional injection of a bound first argument into every call
//! - `SharedTransaction` for committing from several threads
//! - Dynamic `Value` arguments with keyword support
//!
//! ## Usage
//!
//! ```rust
//! use tran_core::{args, Transaction};
//!
//! let mut txn = Transaction::bound(Vec::<i64>::new());
//! txn.push(
//!     |mut call| {
//!         let n = call.integer(0)?;
//!         call.receiver()?.push(n);
//!         Ok(())
//!     },
//!     args![5],
//! )?;
//! txn.commit()?;
//! assert_eq!(txn.into_bound(), Some(vec![5]));
//! # Ok::<(), tran_core::TransactionError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod call;
mod config;
mod error;
mod stats;
mod transaction;
mod value;

pub use call::{Invocation, Keywords, QueuedCall};
pub use config::{PushAfterCommit, TransactionConfig};
pub use error::{ArgumentError, CallError, CallResult, TranResult, TransactionError};
pub use stats::{CommitStats, StatsSnapshot};
pub use transaction::{SharedTransaction, Transaction, TransactionState};
pub use value::Value;
