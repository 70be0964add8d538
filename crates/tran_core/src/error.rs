//! Error types for tran.

use std::error::Error as StdError;
use thiserror::Error;

/// Result type for transaction operations.
pub type TranResult<T> = Result<T, TransactionError>;

/// Errors raised by the transaction itself.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// `commit` was called on a transaction that has already been committed.
    #[error("transaction instance already committed")]
    AlreadyCommitted,

    /// `push` was called on a committed transaction that rejects late calls.
    #[error("cannot push onto a committed transaction")]
    PushAfterCommit,

    /// A queued call returned an error; execution stopped at that call.
    #[error("queued call #{index}{} failed: {source}", label_suffix(.label))]
    CallFailed {
        /// Position of the failing call in the queue.
        index: usize,
        /// Label given to the call when it was pushed, if any.
        label: Option<String>,
        /// The error returned by the callable, unmodified.
        source: CallError,
    },
}

impl TransactionError {
    /// Creates a call failure error.
    pub fn call_failed(index: usize, label: Option<String>, source: CallError) -> Self {
        Self::CallFailed {
            index,
            label,
            source,
        }
    }

    /// Returns true if this is the double-commit guard failure.
    #[must_use]
    pub fn is_already_committed(&self) -> bool {
        matches!(self, Self::AlreadyCommitted)
    }

    /// Returns the queue position of the failing call, if a call failed.
    #[must_use]
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            Self::CallFailed { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Borrows the callable's error, if a call failed.
    #[must_use]
    pub fn call_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::CallFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Takes the callable's error out, if a call failed.
    ///
    /// The returned box is exactly what the callable returned, so callers can
    /// `downcast` it back to their own error type.
    pub fn into_call_error(self) -> Option<CallError> {
        match self {
            Self::CallFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn label_suffix(label: &Option<String>) -> String {
    label
        .as_deref()
        .map(|l| format!(" ({l})"))
        .unwrap_or_default()
}

/// Error type returned by queued callables.
pub type CallError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type returned by queued callables.
pub type CallResult = Result<(), CallError>;

/// Errors raised while a callable reads its arguments.
///
/// These play the part of the invocation mechanism's native errors: nothing
/// checks arity or types at push time, so mismatches surface here, at commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The callable asked for a bound first argument but none was bound.
    #[error("call requires a bound first argument but the transaction has none")]
    MissingReceiver,

    /// A positional argument index was out of range.
    #[error("missing positional argument {index} (call has {len})")]
    MissingArgument {
        /// The requested index.
        index: usize,
        /// Number of positional arguments supplied.
        len: usize,
    },

    /// A required keyword argument was not supplied.
    #[error("missing keyword argument '{name}'")]
    MissingKeyword {
        /// Name of the keyword.
        name: String,
    },

    /// An argument had the wrong type.
    #[error("argument {position} expected {expected}, got {actual}")]
    TypeMismatch {
        /// Positional index or keyword name.
        position: String,
        /// Expected kind of value.
        expected: &'static str,
        /// Actual kind of value.
        actual: &'static str,
    },

    /// The call received the wrong number of positional arguments.
    #[error("expected {expected} positional arguments, got {actual}")]
    Arity {
        /// Expected count.
        expected: usize,
        /// Actual count.
        actual: usize,
    },
}

impl ArgumentError {
    /// Creates a missing keyword error.
    pub fn missing_keyword(name: impl Into<String>) -> Self {
        Self::MissingKeyword { name: name.into() }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        position: impl ToString,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            position: position.to_string(),
            expected,
            actual,
        }
    }
}
