//! Transaction statistics.
//!
//! Counters describing what happened to a transaction's queue. They answer
//! the question the error alone cannot: how many calls ran before a failure.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut txn = Transaction::new();
//! txn.push(|_| Ok(()), vec![])?;
//! let _ = txn.commit();
//!
//! let stats = txn.stats().snapshot();
//! println!("Executed: {}", stats.calls_executed);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-transaction counters.
///
/// Counters are atomic so they can be recorded through `&self`. A commit
/// updates them while it holds the queue mutably, and a snapshot is only
/// observable once the commit has returned.
#[derive(Debug, Default)]
pub struct CommitStats {
    /// Calls accepted into the queue.
    calls_queued: AtomicU64,
    /// Calls that returned successfully during commit.
    calls_executed: AtomicU64,
    /// Calls that returned an error during commit (0 or 1).
    calls_failed: AtomicU64,
    /// Pushes refused because the transaction was committed.
    pushes_rejected: AtomicU64,
    /// Pushes accepted after commit; these never run.
    pushes_retained: AtomicU64,
    /// Commit attempts refused by the single-commit guard.
    commits_rejected: AtomicU64,
}

impl CommitStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_queued(&self) {
        self.calls_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_executed(&self) {
        self.calls_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.calls_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_push_rejected(&self) {
        self.pushes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_push_retained(&self) {
        self.calls_queued.fetch_add(1, Ordering::Relaxed);
        self.pushes_retained.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit_rejected(&self) {
        self.commits_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of calls that ran successfully.
    pub fn calls_executed(&self) -> u64 {
        self.calls_executed.load(Ordering::Relaxed)
    }

    /// Number of calls that failed.
    pub fn calls_failed(&self) -> u64 {
        self.calls_failed.load(Ordering::Relaxed)
    }

    /// Returns a point-in-time copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            calls_queued: self.calls_queued.load(Ordering::Relaxed),
            calls_executed: self.calls_executed.load(Ordering::Relaxed),
            calls_failed: self.calls_failed.load(Ordering::Relaxed),
            pushes_rejected: self.pushes_rejected.load(Ordering::Relaxed),
            pushes_retained: self.pushes_retained.load(Ordering::Relaxed),
            commits_rejected: self.commits_rejected.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`CommitStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Calls accepted into the queue.
    pub calls_queued: u64,
    /// Calls that returned successfully during commit.
    pub calls_executed: u64,
    /// Calls that returned an error during commit.
    pub calls_failed: u64,
    /// Pushes refused because the transaction was committed.
    pub pushes_rejected: u64,
    /// Pushes accepted after commit.
    pub pushes_retained: u64,
    /// Commit attempts refused by the single-commit guard.
    pub commits_rejected: u64,
}

impl StatsSnapshot {
    /// Calls that were queued but did not run, either because an earlier
    /// call failed or because they were pushed after commit.
    pub fn calls_skipped(&self) -> u64 {
        self.calls_queued
            .saturating_sub(self.calls_executed + self.calls_failed)
    }
}
