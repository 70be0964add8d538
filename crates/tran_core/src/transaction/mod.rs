//! Deferred call queues with a single-commit guard.
//!
//! A transaction here is a queue, not a unit of atomicity:
//! - **Ordering**: calls run in the order they were pushed
//! - **At most once**: the queue runs on the first commit only
//! - **Fail fast**: the first failing call stops the commit
//! - **No rollback**: effects of calls that already ran stay in place

mod shared;
mod state;

pub use shared::SharedTransaction;
pub use state::{Transaction, TransactionState};
