//! The executable unit produced by compilation.

use anyhow::Result;
use serde_json::Value;
use stagehand_types::{ConfigValue, ExecutionContext};

use crate::{compiler::Compiler, error::ExecutionError};

/// A node in a compiled action tree.
///
/// Concrete actions are configured once, right after the registry instantiates
/// them, and may then be executed any number of times. Composite actions own
/// their children exclusively; the tree is acyclic by construction because
/// each `configure` call only consumes configuration already present in its
/// input.
///
/// Actions registered under the constructor strategy must also be
/// default-constructible, and every action must support structural
/// duplication so it can serve as a prototype.
pub trait Action: Send {
    /// Short name used in logs and error provenance, e.g. `"if"`.
    fn label(&self) -> &str;

    /// Consumes raw configuration.
    ///
    /// A bare action reference is configured with `ConfigValue::Null`; a
    /// mapping-dispatched action receives the entire mapping, including its
    /// own name key, and extracts whatever parameters it needs. Nested
    /// configuration is compiled by calling back into `compiler`; that
    /// callback is how the tree recurses.
    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()>;

    /// Runs the action against the caller-owned context.
    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError>;

    /// Returns an independent structural duplicate of this node.
    ///
    /// Duplicates share no mutable state with the original; mutating one has
    /// no effect on the other. Required by the prototype registry strategy.
    fn duplicate(&self) -> Box<dyn Action>;
}
