//! Test fixtures: call recorders and sentinel signals.
//!
//! A [`CallRecorder`] hands out callables that log every invocation into a
//! shared list, so tests can assert on execution order and on the exact
//! arguments each call received.

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tran_core::{CallResult, Invocation, Keywords, Value};

/// Error returned by fixture callables.
///
/// `Success` carries a description of what the callable saw, which lets a
/// test observe arguments through the error path alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Signal {
    /// The callable ran and reports what it observed.
    #[error("success: {0}")]
    Success(String),
    /// The callable ran and signals a deliberate failure.
    #[error("deliberate failure")]
    Failure,
}

/// One invocation seen by a [`CallRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Name given to the callable.
    pub name: String,
    /// Whether a bound first argument was delivered.
    pub had_receiver: bool,
    /// Delivered argument count, including the bound first argument.
    pub arity: usize,
    /// Positional arguments (without the bound first argument).
    pub positional: Vec<Value>,
    /// Keyword arguments.
    pub keywords: Keywords,
}

/// Shared log of invocations.
#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn record<T>(&self, name: &str, inv: &Invocation<'_, T>) {
        self.calls.lock().push(RecordedCall {
            name: name.to_string(),
            had_receiver: inv.has_receiver(),
            arity: inv.len(),
            positional: inv.positional().to_vec(),
            keywords: inv.keywords().clone(),
        });
    }

    /// Returns a callable that records its invocation and succeeds.
    pub fn callable<T>(
        &self,
        name: impl Into<String>,
    ) -> impl FnMut(Invocation<'_, T>) -> CallResult + Send {
        let recorder = self.clone();
        let name = name.into();
        move |inv: Invocation<'_, T>| {
            recorder.record(&name, &inv);
            Ok(())
        }
    }

    /// Returns a callable that records its invocation and then fails with
    /// `error`.
    pub fn failing<T>(
        &self,
        name: impl Into<String>,
        error: Signal,
    ) -> impl FnMut(Invocation<'_, T>) -> CallResult + Send {
        let recorder = self.clone();
        let name = name.into();
        move |inv: Invocation<'_, T>| {
            recorder.record(&name, &inv);
            Err(error.clone().into())
        }
    }

    /// Returns every recorded invocation in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the names of recorded invocations in order.
    pub fn names(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the number of recorded invocations.
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forgets every recorded invocation.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// A callable of two arguments that reports them through
/// `Signal::Success("a=.. and b=..")`.
///
/// `b` may be passed positionally or as a keyword.
pub fn report_pair<T>(inv: Invocation<'_, T>) -> CallResult {
    let a = inv.arg(0)?;
    let b = match inv.keyword("b") {
        Some(b) => b,
        None => inv.arg(1)?,
    };
    Err(Signal::Success(format!("a={a} and b={b}")).into())
}
