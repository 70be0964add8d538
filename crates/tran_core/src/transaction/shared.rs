//! Thread-safe transaction handle.

use crate::call::{Invocation, Keywords};
use crate::error::{CallResult, TranResult};
use crate::stats::StatsSnapshot;
use crate::transaction::state::{Transaction, TransactionState};
use crate::value::Value;
use parking_lot::Mutex;

/// A transaction that can be pushed to and committed through `&self`.
///
/// The commit guard runs under a mutex, so when several threads race to
/// commit exactly one of them executes the queue and the rest get
/// `TransactionError::AlreadyCommitted`.
///
/// The lock is held for the whole commit. A queued call must not push to or
/// commit the same `SharedTransaction`; doing so deadlocks.
#[derive(Debug)]
pub struct SharedTransaction<'a, T = ()> {
    inner: Mutex<Transaction<'a, T>>,
}

impl<'a, T> SharedTransaction<'a, T> {
    /// Wraps a transaction.
    pub fn new(txn: Transaction<'a, T>) -> Self {
        Self {
            inner: Mutex::new(txn),
        }
    }

    /// Queues a call with positional arguments only.
    pub fn push<F>(&self, callable: F, positional: Vec<Value>) -> TranResult<()>
    where
        F: FnMut(Invocation<'_, T>) -> CallResult + Send + 'a,
    {
        self.inner.lock().push(callable, positional)
    }

    /// Queues a call with positional and keyword arguments.
    pub fn push_with<F>(
        &self,
        callable: F,
        positional: Vec<Value>,
        keywords: Keywords,
    ) -> TranResult<()>
    where
        F: FnMut(Invocation<'_, T>) -> CallResult + Send + 'a,
    {
        self.inner.lock().push_with(callable, positional, keywords)
    }

    /// Commits the wrapped transaction. See [`Transaction::commit`].
    pub fn commit(&self) -> TranResult<()> {
        self.inner.lock().commit()
    }

    /// Returns the current state.
    pub fn state(&self) -> TransactionState {
        self.inner.lock().state()
    }

    /// Checks if commit has been attempted.
    pub fn is_committed(&self) -> bool {
        self.inner.lock().is_committed()
    }

    /// Returns the number of queued calls.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns a copy of the transaction's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.lock().stats().snapshot()
    }

    /// Unwraps the transaction.
    pub fn into_inner(self) -> Transaction<'a, T> {
        self.inner.into_inner()
    }
}

impl<'a, T> From<Transaction<'a, T>> for SharedTransaction<'a, T> {
    fn from(txn: Transaction<'a, T>) -> Self {
        Self::new(txn)
    }
}

impl<'a, T> Transaction<'a, T> {
    /// Converts into a handle usable from several threads.
    pub fn into_shared(self) -> SharedTransaction<'a, T> {
        SharedTransaction::new(self)
    }
}
