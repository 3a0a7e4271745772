//! Runtime execution context.
//!
//! The context is the mutable key/value scope a compiled action tree executes
//! against. The caller owns it; every node borrows it for the duration of its
//! `execute` call. The engine core never inspects the contents. Only actions
//! and the expression evaluator read and write variables.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Mutable variable scope threaded through action execution.
///
/// Variables hold arbitrary JSON values: expression evaluation resolves paths
/// into them, assignment expressions and the `set` action write them, and
/// loop actions bind and restore them around iterations.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    variables: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Stores a variable, returning any value it shadowed.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.variables.insert(name.into(), value)
    }

    /// Removes a variable, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Read-only view of all variables.
    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }
}

impl FromIterator<(String, Value)> for ExecutionContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().collect(),
        }
    }
}
