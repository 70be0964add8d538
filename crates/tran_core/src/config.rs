//! Transaction configuration.

/// What `push` does once the transaction has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushAfterCommit {
    /// Refuse the call with `TransactionError::PushAfterCommit`.
    #[default]
    Reject,
    /// Append the call anyway. It stays in the queue but never runs, since a
    /// second commit is refused.
    Retain,
}

/// Configuration for a transaction.
#[derive(Debug, Clone)]
pub struct TransactionConfig {
    /// Policy for calls pushed after commit.
    pub push_after_commit: PushAfterCommit,

    /// Number of queue slots to reserve up front.
    pub initial_capacity: usize,

    /// Whether to emit a debug event for every queued and executed call.
    pub log_calls: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            push_after_commit: PushAfterCommit::Reject,
            initial_capacity: 0,
            log_calls: true,
        }
    }
}

impl TransactionConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for calls pushed after commit.
    #[must_use]
    pub const fn push_after_commit(mut self, policy: PushAfterCommit) -> Self {
        self.push_after_commit = policy;
        self
    }

    /// Sets the number of queue slots to reserve.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets whether per-call debug events are emitted.
    #[must_use]
    pub const fn log_calls(mut self, value: bool) -> Self {
        self.log_calls = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TransactionConfig::default();
        assert_eq!(config.push_after_commit, PushAfterCommit::Reject);
        assert_eq!(config.initial_capacity, 0);
        assert!(config.log_calls);
    }

    #[test]
    fn builder_pattern() {
        let config = TransactionConfig::new()
            .push_after_commit(PushAfterCommit::Retain)
            .initial_capacity(16)
            .log_calls(false);

        assert_eq!(config.push_after_commit, PushAfterCommit::Retain);
        assert_eq!(config.initial_capacity, 16);
        assert!(!config.log_calls);
    }
}
