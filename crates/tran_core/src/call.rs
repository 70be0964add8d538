//! Queued calls and the argument view handed to them at commit time.

use crate::error::{ArgumentError, CallResult};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Keyword arguments: parameter name to value, names unique.
pub type Keywords = BTreeMap<String, Value>;

type BoxedCallable<'a, T> = Box<dyn FnMut(Invocation<'_, T>) -> CallResult + Send + 'a>;

/// A deferred invocation record awaiting commit.
///
/// The positional arguments never include the bound first argument; the
/// transaction supplies that when the call runs.
pub struct QueuedCall<'a, T> {
    callable: BoxedCallable<'a, T>,
    positional: Vec<Value>,
    keywords: Keywords,
    label: Option<String>,
}

impl<'a, T> QueuedCall<'a, T> {
    /// Creates a new queued call.
    pub fn new<F>(callable: F, positional: Vec<Value>, keywords: Keywords) -> Self
    where
        F: FnMut(Invocation<'_, T>) -> CallResult + Send + 'a,
    {
        Self {
            callable: Box::new(callable),
            positional,
            keywords,
            label: None,
        }
    }

    /// Attaches a label shown in logs and errors.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the positional arguments supplied at push time.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Returns the keyword arguments supplied at push time.
    #[must_use]
    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// Returns the label, if one was given.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Runs the callable with the given receiver in front of the stored
    /// arguments.
    pub(crate) fn invoke(&mut self, receiver: Option<&mut T>) -> CallResult {
        (self.callable)(Invocation {
            receiver,
            positional: &self.positional,
            keywords: &self.keywords,
        })
    }
}

impl<T> fmt::Debug for QueuedCall<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedCall")
            .field("label", &self.label)
            .field("positional", &self.positional)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

/// The arguments a queued call receives when it runs.
///
/// The bound first argument, when the transaction has one, is the leading
/// argument and is reached through [`Invocation::receiver`]. Positional
/// indexes passed to [`Invocation::arg`] and friends start after it.
pub struct Invocation<'c, T> {
    receiver: Option<&'c mut T>,
    positional: &'c [Value],
    keywords: &'c Keywords,
}

impl<'c, T> Invocation<'c, T> {
    /// Returns the bound first argument.
    ///
    /// Fails with `ArgumentError::MissingReceiver` when the transaction was
    /// created without one.
    pub fn receiver(&mut self) -> Result<&mut T, ArgumentError> {
        self.receiver
            .as_deref_mut()
            .ok_or(ArgumentError::MissingReceiver)
    }

    /// Returns true if a bound first argument is present.
    #[must_use]
    pub fn has_receiver(&self) -> bool {
        self.receiver.is_some()
    }

    /// Number of positional arguments delivered, counting the bound first
    /// argument.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + usize::from(self.receiver.is_some())
    }

    /// Returns true if no positional argument was delivered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the pushed positional arguments (without the receiver).
    #[must_use]
    pub fn positional(&self) -> &'c [Value] {
        self.positional
    }

    /// Returns the keyword arguments.
    #[must_use]
    pub fn keywords(&self) -> &'c Keywords {
        self.keywords
    }

    /// Checks that exactly `expected` positional arguments were pushed.
    pub fn expect_arity(&self, expected: usize) -> Result<(), ArgumentError> {
        let actual = self.positional.len();
        if actual == expected {
            Ok(())
        } else {
            Err(ArgumentError::Arity { expected, actual })
        }
    }

    /// Returns the positional argument at `index`.
    pub fn arg(&self, index: usize) -> Result<&'c Value, ArgumentError> {
        self.positional
            .get(index)
            .ok_or(ArgumentError::MissingArgument {
                index,
                len: self.positional.len(),
            })
    }

    /// Returns the positional argument at `index` as an integer.
    pub fn integer(&self, index: usize) -> Result<i64, ArgumentError> {
        let value = self.arg(index)?;
        value
            .as_integer()
            .ok_or_else(|| ArgumentError::type_mismatch(index, "integer", value.kind()))
    }

    /// Returns the positional argument at `index` as a float.
    pub fn float(&self, index: usize) -> Result<f64, ArgumentError> {
        let value = self.arg(index)?;
        value
            .as_float()
            .ok_or_else(|| ArgumentError::type_mismatch(index, "float", value.kind()))
    }

    /// Returns the positional argument at `index` as a boolean.
    pub fn boolean(&self, index: usize) -> Result<bool, ArgumentError> {
        let value = self.arg(index)?;
        value
            .as_bool()
            .ok_or_else(|| ArgumentError::type_mismatch(index, "bool", value.kind()))
    }

    /// Returns the positional argument at `index` as text.
    pub fn text(&self, index: usize) -> Result<&'c str, ArgumentError> {
        let value = self.arg(index)?;
        value
            .as_text()
            .ok_or_else(|| ArgumentError::type_mismatch(index, "text", value.kind()))
    }

    /// Returns the keyword argument `name`, if supplied.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&'c Value> {
        self.keywords.get(name)
    }

    /// Returns the keyword argument `name`, failing if it was not supplied.
    pub fn require_keyword(&self, name: &str) -> Result<&'c Value, ArgumentError> {
        self.keyword(name)
            .ok_or_else(|| ArgumentError::missing_keyword(name))
    }
}

impl<T> fmt::Debug for Invocation<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("has_receiver", &self.receiver.is_some())
            .field("positional", &self.positional)
            .field("keywords", &self.keywords)
            .finish()
    }
}
