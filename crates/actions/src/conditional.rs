//! Conditional branching.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use stagehand_engine::{Action, Compiler, ExecutionError, Expression, ServiceContainer};
use stagehand_types::{ConfigValue, ExecutionContext, is_truthy};

/// `{if: <condition>, then: <config>, else: <config>}`
///
/// Evaluates the condition and executes one branch; a missing branch yields
/// `Null`.
#[derive(Default)]
pub struct IfAction {
    condition: Expression,
    then_branch: Option<Box<dyn Action>>,
    else_branch: Option<Box<dyn Action>>,
    services: Arc<ServiceContainer>,
}

impl Action for IfAction {
    fn label(&self) -> &str {
        "if"
    }

    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        self.services = Arc::clone(compiler.services());
        let condition = config.get("if").context("'if' requires a condition expression")?;
        self.condition = Expression::from_config(condition)?;
        if let Some(branch) = config.get("then") {
            self.then_branch = Some(compiler.compile(branch)?);
        }
        if let Some(branch) = config.get("else") {
            self.else_branch = Some(compiler.compile(branch)?);
        }
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let verdict = self.condition.evaluate("if", &self.services, context)?;
        let taken = is_truthy(&verdict);
        debug!(condition = ?self.condition.source_text(), taken, "conditional evaluated");

        let branch = if taken {
            self.then_branch.as_mut()
        } else {
            self.else_branch.as_mut()
        };
        match branch {
            Some(branch) => branch.execute(context),
            None => Ok(Value::Null),
        }
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(IfAction {
            condition: self.condition.clone(),
            then_branch: self.then_branch.as_ref().map(|branch| branch.duplicate()),
            else_branch: self.else_branch.as_ref().map(|branch| branch.duplicate()),
            services: Arc::clone(&self.services),
        })
    }
}
