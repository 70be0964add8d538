//! Transaction state.

use crate::call::{Invocation, Keywords, QueuedCall};
use crate::config::{PushAfterCommit, TransactionConfig};
use crate::error::{CallResult, TranResult, TransactionError};
use crate::stats::CommitStats;
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Calls may be queued; commit has not been attempted.
    Open,
    /// Commit has started. The transaction never leaves this state.
    Committed,
}

/// A queue of deferred calls executed by a single commit.
///
/// There is no atomicity, rollback or isolation: `commit` runs the queued
/// calls in insertion order and stops at the first failure, leaving the
/// effects of earlier calls in place. The only guarantee is that the queue
/// runs at most once.
///
/// When the transaction is bound, every call receives the bound value as its
/// leading argument. The value is stored once and handed out at commit time,
/// so the stored arguments of a queued call never include it.
#[derive(Debug)]
pub struct Transaction<'a, T = ()> {
    /// Identifier used in log output.
    id: u64,
    /// Bound first argument.
    bound: Option<T>,
    /// Pending calls in execution order.
    queue: Vec<QueuedCall<'a, T>>,
    /// Current state.
    state: TransactionState,
    config: TransactionConfig,
    stats: CommitStats,
}

impl Transaction<'_, ()> {
    /// Creates a transaction with no bound first argument.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(None, TransactionConfig::default())
    }
}

impl Default for Transaction<'_, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> Transaction<'a, T> {
    /// Creates a transaction whose calls all receive `value` as their leading
    /// argument.
    ///
    /// Presence is all that matters: an empty collection or a zero is still
    /// bound and still injected.
    #[must_use]
    pub fn bound(value: T) -> Self {
        Self::with_config(Some(value), TransactionConfig::default())
    }

    /// Creates a transaction with an explicit configuration.
    #[must_use]
    pub fn with_config(bound: Option<T>, config: TransactionConfig) -> Self {
        Self {
            id: NEXT_TXN_ID.fetch_add(1, Ordering::Relaxed),
            bound,
            queue: Vec::with_capacity(config.initial_capacity),
            state: TransactionState::Open,
            config,
            stats: CommitStats::new(),
        }
    }

    /// Returns the identifier used in log output.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if commit has been attempted.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }

    /// Returns true if the transaction has a bound first argument.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Returns the bound first argument.
    #[must_use]
    pub fn bound_value(&self) -> Option<&T> {
        self.bound.as_ref()
    }

    /// Consumes the transaction and returns the bound first argument.
    pub fn into_bound(self) -> Option<T> {
        self.bound
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Returns the counters for this transaction.
    #[must_use]
    pub fn stats(&self) -> &CommitStats {
        &self.stats
    }

    /// Returns the queued calls in execution order.
    #[must_use]
    pub fn queue(&self) -> &[QueuedCall<'a, T>] {
        &self.queue
    }

    /// Returns the queued call at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QueuedCall<'a, T>> {
        self.queue.get(index)
    }

    /// Returns the number of queued calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues a call with positional arguments only.
    pub fn push<F>(&mut self, callable: F, positional: Vec<Value>) -> TranResult<()>
    where
        F: FnMut(Invocation<'_, T>) -> CallResult + Send + 'a,
    {
        self.push_call(QueuedCall::new(callable, positional, Keywords::new()))
    }

    /// Queues a call with positional and keyword arguments.
    pub fn push_with<F>(
        &mut self,
        callable: F,
        positional: Vec<Value>,
        keywords: Keywords,
    ) -> TranResult<()>
    where
        F: FnMut(Invocation<'_, T>) -> CallResult + Send + 'a,
    {
        self.push_call(QueuedCall::new(callable, positional, keywords))
    }

    /// Queues a labeled call. The label shows up in logs and in
    /// `TransactionError::CallFailed`.
    pub fn push_labeled<F>(
        &mut self,
        label: impl Into<String>,
        callable: F,
        positional: Vec<Value>,
        keywords: Keywords,
    ) -> TranResult<()>
    where
        F: FnMut(Invocation<'_, T>) -> CallResult + Send + 'a,
    {
        self.push_call(QueuedCall::new(callable, positional, keywords).with_label(label))
    }

    /// Appends a prepared call to the queue.
    ///
    /// Nothing about the callable or its arguments is checked here. Once the
    /// transaction is committed the outcome depends on
    /// [`TransactionConfig::push_after_commit`]: the call is either refused,
    /// or appended and never run.
    pub fn push_call(&mut self, call: QueuedCall<'a, T>) -> TranResult<()> {
        if self.is_committed() {
            match self.config.push_after_commit {
                PushAfterCommit::Reject => {
                    self.stats.record_push_rejected();
                    warn!(txn = self.id, label = call.label(), "push rejected after commit");
                    return Err(TransactionError::PushAfterCommit);
                }
                PushAfterCommit::Retain => {
                    self.stats.record_push_retained();
                    warn!(
                        txn = self.id,
                        index = self.queue.len(),
                        label = call.label(),
                        "call pushed after commit will never run"
                    );
                    self.queue.push(call);
                    return Ok(());
                }
            }
        }

        if self.config.log_calls {
            debug!(
                txn = self.id,
                index = self.queue.len(),
                label = call.label(),
                args = call.positional().len(),
                kwargs = call.keywords().len(),
                "queued call"
            );
        }
        self.stats.record_queued();
        self.queue.push(call);
        Ok(())
    }

    /// Runs every queued call, in insertion order, exactly once.
    ///
    /// The transaction is marked committed before the first call runs, so a
    /// failure part-way through still leaves it committed. Execution stops at
    /// the first call that returns an error; that error is returned inside
    /// `TransactionError::CallFailed` and the remaining calls are skipped.
    ///
    /// # Errors
    ///
    /// - `TransactionError::AlreadyCommitted` if commit was already attempted.
    ///   Nothing runs.
    /// - `TransactionError::CallFailed` if a queued call failed.
    pub fn commit(&mut self) -> TranResult<()> {
        if self.is_committed() {
            self.stats.record_commit_rejected();
            warn!(txn = self.id, "commit rejected: transaction already committed");
            return Err(TransactionError::AlreadyCommitted);
        }
        self.state = TransactionState::Committed;

        info!(
            txn = self.id,
            calls = self.queue.len(),
            bound = self.bound.is_some(),
            "committing transaction"
        );

        let mut receiver = self.bound.as_mut();
        for (index, call) in self.queue.iter_mut().enumerate() {
            if self.config.log_calls {
                debug!(txn = self.id, index, label = call.label(), "executing call");
            }

            if let Err(source) = call.invoke(receiver.as_deref_mut()) {
                self.stats.record_failed();
                warn!(
                    txn = self.id,
                    index,
                    label = call.label(),
                    error = %source,
                    "queued call failed, stopping commit"
                );
                return Err(TransactionError::call_failed(
                    index,
                    call.label().map(str::to_owned),
                    source,
                ));
            }
            self.stats.record_executed();
        }

        info!(
            txn = self.id,
            executed = self.stats.calls_executed(),
            "transaction committed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArgumentError;
    use crate::{args, kwargs};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, thiserror::Error)]
    #[error("sentinel {0}")]
    struct Sentinel(i64);

    #[test]
    fn new_transaction_is_open() {
        let txn = Transaction::new();
        assert_eq!(txn.state(), TransactionState::Open);
        assert!(!txn.is_committed());
        assert!(!txn.is_bound());
        assert!(txn.is_empty());
    }

    #[test]
    fn push_records_call() {
        let mut txn = Transaction::new();
        txn.push(|_| Ok(()), args![1, 2]).unwrap();

        assert_eq!(txn.len(), 1);
        assert_eq!(txn.get(0).unwrap().positional(), &args![1, 2][..]);
        assert!(txn.get(0).unwrap().keywords().is_empty());
        assert_eq!(txn.stats().snapshot().calls_queued, 1);
    }

    #[test]
    fn commit_empty_queue() {
        let mut txn = Transaction::new();
        txn.commit().unwrap();
        assert!(txn.is_committed());
        assert_eq!(txn.stats().calls_executed(), 0);
    }

    #[test]
    fn commit_twice_fails_without_rerunning() {
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let mut txn = Transaction::new();
        txn.push(
            move |_| {
                *counter.lock().unwrap() += 1;
                Ok(())
            },
            args![],
        )
        .unwrap();

        txn.commit().unwrap();
        let err = txn.commit().unwrap_err();
        assert!(err.is_already_committed());
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(txn.stats().snapshot().commits_rejected, 1);
    }

    #[test]
    fn state_is_committed_even_when_a_call_fails() {
        let mut txn = Transaction::new();
        txn.push(|_| Err(Sentinel(7).into()), args![]).unwrap();

        let err = txn.commit().unwrap_err();
        assert_eq!(err.failed_index(), Some(0));
        assert!(txn.is_committed());
        assert!(txn.commit().unwrap_err().is_already_committed());
    }

    #[test]
    fn bound_value_is_leading_argument() {
        let mut txn = Transaction::bound(Vec::<i64>::new());
        txn.push(
            |mut inv| {
                let n = inv.integer(0)?;
                inv.receiver()?.push(n);
                Ok(())
            },
            args![5],
        )
        .unwrap();

        // Stored arguments do not include the bound value.
        assert_eq!(txn.get(0).unwrap().positional().len(), 1);

        txn.commit().unwrap();
        assert_eq!(txn.into_bound(), Some(vec![5]));
    }

    #[test]
    fn empty_bound_value_is_still_injected() {
        let mut txn = Transaction::bound(String::new());
        txn.push(
            |mut inv| {
                assert_eq!(inv.len(), 1);
                inv.receiver()?.push('x');
                Ok(())
            },
            args![],
        )
        .unwrap();
        assert!(txn.is_bound());
        assert_eq!(txn.bound_value().map(String::as_str), Some(""));

        txn.commit().unwrap();
        assert_eq!(txn.into_bound().as_deref(), Some("x"));
    }

    #[test]
    fn unbound_calls_get_exact_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut txn = Transaction::new();
        txn.push(
            move |inv| {
                assert!(!inv.has_receiver());
                sink.lock().unwrap().extend_from_slice(inv.positional());
                Ok(())
            },
            args![1, "b"],
        )
        .unwrap();
        txn.commit().unwrap();
        assert_eq!(*seen.lock().unwrap(), args![1, "b"]);
    }

    #[test]
    fn receiver_on_unbound_transaction_fails_at_commit() {
        let mut txn: Transaction<'_, Vec<i64>> =
            Transaction::with_config(None, TransactionConfig::default());
        txn.push(
            |mut inv| {
                inv.receiver()?.clear();
                Ok(())
            },
            args![],
        )
        .unwrap();

        let source = txn.commit().unwrap_err().into_call_error().unwrap();
        assert_eq!(
            source.downcast_ref::<ArgumentError>(),
            Some(&ArgumentError::MissingReceiver)
        );
    }

    #[test]
    fn keywords_are_delivered() {
        let mut txn = Transaction::new();
        txn.push_with(
            |inv| {
                let b = inv.require_keyword("b")?.as_integer().unwrap_or_default();
                Err(Sentinel(b).into())
            },
            args![1],
            kwargs! { "b" => 42 },
        )
        .unwrap();

        let source = txn.commit().unwrap_err().into_call_error().unwrap();
        assert_eq!(source.downcast::<Sentinel>().unwrap().0, 42);
    }

    #[test]
    fn failure_stops_execution() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut txn = Transaction::new();
        for i in 0..4 {
            let log = Arc::clone(&log);
            txn.push_labeled(
                format!("step{i}"),
                move |_| {
                    log.lock().unwrap().push(i);
                    if i == 1 {
                        Err(Sentinel(i).into())
                    } else {
                        Ok(())
                    }
                },
                args![],
                kwargs!(),
            )
            .unwrap();
        }

        let err = txn.commit().unwrap_err();
        match &err {
            TransactionError::CallFailed { index, label, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(label.as_deref(), Some("step1"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);

        let snap = txn.stats().snapshot();
        assert_eq!(snap.calls_executed, 1);
        assert_eq!(snap.calls_failed, 1);
        assert_eq!(snap.calls_skipped(), 2);
    }

    #[test]
    fn push_after_commit_is_rejected_by_default() {
        let mut txn = Transaction::new();
        txn.commit().unwrap();

        let err = txn.push(|_| Ok(()), args![]).unwrap_err();
        assert!(matches!(err, TransactionError::PushAfterCommit));
        assert!(txn.is_empty());
        assert_eq!(txn.stats().snapshot().pushes_rejected, 1);
    }

    #[test]
    fn push_after_commit_can_be_retained() {
        let config = TransactionConfig::new().push_after_commit(PushAfterCommit::Retain);
        let mut txn = Transaction::with_config(None::<()>, config);
        txn.commit().unwrap();

        txn.push(|_| panic!("must never run"), args![]).unwrap();
        assert_eq!(txn.len(), 1);
        assert!(txn.commit().unwrap_err().is_already_committed());

        let snap = txn.stats().snapshot();
        assert_eq!(snap.pushes_retained, 1);
        assert_eq!(snap.calls_skipped(), 1);
    }

    #[test]
    fn initial_capacity_is_reserved() {
        let config = TransactionConfig::new().initial_capacity(32).log_calls(false);
        let txn = Transaction::with_config(None::<()>, config);
        assert!(txn.queue.capacity() >= 32);
        assert!(!txn.config().log_calls);
    }

    #[test]
    fn ids_are_unique() {
        let a = Transaction::new();
        let b = Transaction::new();
        assert_ne!(a.id(), b.id());
    }
}
