//! Structural actions the compiler emits itself.
//!
//! `Noop` stands in for empty configuration and `Series` for ordered
//! sequences. Everything else comes out of the registry.

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use stagehand_types::{ConfigValue, ExecutionContext};

use crate::action::Action;
use crate::compiler::Compiler;
use crate::error::ExecutionError;

/// Does nothing: executes to `Null` and never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Noop;

impl Action for Noop {
    fn label(&self) -> &str {
        "noop"
    }

    fn configure(&mut self, _compiler: &Compiler<'_>, _config: &ConfigValue) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, _context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        Ok(Value::Null)
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(*self)
    }
}

/// Ordered composite: owns one child per sequence element and executes them
/// in order, yielding the last child's value.
#[derive(Default)]
pub struct Series {
    children: Vec<Box<dyn Action>>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Action for Series {
    fn label(&self) -> &str {
        "series"
    }

    /// Compiles every element of the sequence into a child, in order, by
    /// calling back into the compiler.
    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        let ConfigValue::Sequence(items) = config else {
            anyhow::bail!("series expects a sequence of child configurations");
        };
        for item in items {
            self.children.push(compiler.compile(item)?);
        }
        debug!(children = self.children.len(), "series configured");
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let mut last = Value::Null;
        for child in &mut self.children {
            last = child.execute(context)?;
        }
        Ok(last)
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(Series {
            children: self.children.iter().map(|child| child.duplicate()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActionRegistry;
    use crate::services::ServiceContainer;
    use std::sync::Arc;

    #[test]
    fn noop_executes_to_null() {
        let mut context = ExecutionContext::new();
        assert_eq!(Noop.execute(&mut context).unwrap(), Value::Null);
    }

    #[test]
    fn series_rejects_non_sequence_configuration() {
        let registry = ActionRegistry::new();
        let compiler = Compiler::new(&registry, Arc::new(ServiceContainer::new()));
        let config: ConfigValue = serde_yaml::from_str("{key: value}").unwrap();

        let error = Series::default().configure(&compiler, &config).unwrap_err();
        assert!(error.to_string().contains("sequence"));
    }

    #[test]
    fn empty_series_yields_null() {
        let mut context = ExecutionContext::new();
        assert_eq!(Series::default().execute(&mut context).unwrap(), Value::Null);
    }
}
