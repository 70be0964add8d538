//! Property-based test generators using proptest.
//!
//! Provides strategies for argument values and for sequences of pushes.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use tran_core::{Keywords, Value};

/// Strategy for scalar argument values.
///
/// Floats are kept finite so generated values compare equal to themselves.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9..1.0e9f64).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::Text),
        vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ]
}

/// Strategy for argument values, including nested arrays and maps.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_value_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::Array),
            btree_map("[a-z]{1,6}", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

/// Strategy for a positional argument list.
pub fn positional_strategy(max_len: usize) -> impl Strategy<Value = Vec<Value>> {
    vec(value_strategy(), 0..=max_len)
}

/// Strategy for keyword arguments with identifier-like names.
pub fn keywords_strategy(max_len: usize) -> impl Strategy<Value = Keywords> {
    btree_map("[a-z_][a-z0-9_]{0,7}", value_strategy(), 0..=max_len)
}

/// One planned `push`.
#[derive(Debug, Clone)]
pub struct PushPlan {
    /// Positional arguments to push.
    pub positional: Vec<Value>,
    /// Keyword arguments to push.
    pub keywords: Keywords,
}

/// Strategy for a single planned push.
pub fn push_plan_strategy() -> impl Strategy<Value = PushPlan> {
    (positional_strategy(4), keywords_strategy(3))
        .prop_map(|(positional, keywords)| PushPlan {
            positional,
            keywords,
        })
}

/// Strategy for a sequence of planned pushes.
pub fn push_sequence_strategy(
    min_pushes: usize,
    max_pushes: usize,
) -> impl Strategy<Value = Vec<PushPlan>> {
    vec(push_plan_strategy(), min_pushes..max_pushes)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
