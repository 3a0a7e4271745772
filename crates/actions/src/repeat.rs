//! Looping actions: `while` and `foreach`.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use tracing::{debug, warn};

use stagehand_engine::{Action, Compiler, ExecutionError, Expression, ServiceContainer};
use stagehand_types::{ConfigValue, ExecutionContext, is_truthy};

/// Upper bound on loop iterations when no explicit `limit` is given.
const MAX_ITERATIONS: u64 = 10_000;

/// `{while: <condition>, do: <config>, limit: <n>}`
///
/// Re-evaluates the condition before every iteration. The iteration cap
/// guards against conditions that never turn false; exceeding it is an
/// execution error, not a silent stop.
#[derive(Default)]
pub struct WhileAction {
    condition: Expression,
    body: Option<Box<dyn Action>>,
    limit: Option<u64>,
    services: Arc<ServiceContainer>,
}

impl Action for WhileAction {
    fn label(&self) -> &str {
        "while"
    }

    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        self.services = Arc::clone(compiler.services());
        let condition = config.get("while").context("'while' requires a condition expression")?;
        self.condition = Expression::from_config(condition)?;
        if let Some(body) = config.get("do") {
            self.body = Some(compiler.compile(body)?);
        }
        if let Some(limit) = config.get("limit") {
            let Some(limit) = limit.as_u64() else {
                bail!("'limit' must be a non-negative integer");
            };
            self.limit = Some(limit);
        }
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let limit = self.limit.unwrap_or(MAX_ITERATIONS);
        let mut iterations = 0u64;
        let mut last = Value::Null;

        loop {
            let verdict = self.condition.evaluate("while", &self.services, context)?;
            if !is_truthy(&verdict) {
                break;
            }
            iterations += 1;
            if iterations > limit {
                warn!(limit, "while loop exceeded its iteration cap");
                return Err(ExecutionError::message("while", format!("loop exceeded {limit} iterations")));
            }
            if let Some(body) = self.body.as_mut() {
                last = body.execute(context)?;
            }
        }
        debug!(iterations, "while loop finished");
        Ok(last)
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(WhileAction {
            condition: self.condition.clone(),
            body: self.body.as_ref().map(|body| body.duplicate()),
            limit: self.limit,
            services: Arc::clone(&self.services),
        })
    }
}

/// `{foreach: <expression>, as: <name>, do: <config>}`
///
/// Iterates a sequence (elements) or a mapping (`{key, value}` pairs),
/// binding each item to the loop variable (`item` unless `as` renames it)
/// and restoring whatever the variable previously held once the loop ends.
#[derive(Default)]
pub struct ForEachAction {
    source: Expression,
    binding: String,
    body: Option<Box<dyn Action>>,
    services: Arc<ServiceContainer>,
}

impl Action for ForEachAction {
    fn label(&self) -> &str {
        "foreach"
    }

    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        self.services = Arc::clone(compiler.services());
        let source = config.get("foreach").context("'foreach' requires a collection expression")?;
        self.source = Expression::from_config(source)?;
        self.binding = match config.get("as") {
            Some(name) => name
                .as_str()
                .map(str::to_string)
                .context("'as' must be a variable name")?,
            None => "item".to_string(),
        };
        let body = config.get("do").context("'foreach' requires a 'do' body")?;
        self.body = Some(compiler.compile(body)?);
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let collection = self.source.evaluate("foreach", &self.services, context)?;
        let items: Vec<Value> = match collection {
            Value::Array(items) => items,
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| json!({"key": key, "value": value}))
                .collect(),
            Value::Null => Vec::new(),
            other => {
                return Err(ExecutionError::message(
                    "foreach",
                    format!("expression must yield a sequence or mapping, got {other}"),
                ));
            }
        };
        debug!(binding = %self.binding, items = items.len(), "foreach loop starting");

        let Some(body) = self.body.as_mut() else {
            return Ok(Value::Null);
        };
        let shadowed = context.get(&self.binding).cloned();
        let mut outcome = Ok(Value::Null);
        for item in items {
            context.set(self.binding.clone(), item);
            match body.execute(context) {
                Ok(value) => outcome = Ok(value),
                Err(error) => {
                    outcome = Err(error);
                    break;
                }
            }
        }

        // Restore whatever the loop variable shadowed, even on failure.
        match shadowed {
            Some(previous) => context.set(self.binding.clone(), previous),
            None => context.remove(&self.binding),
        };
        outcome
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(ForEachAction {
            source: self.source.clone(),
            binding: self.binding.clone(),
            body: self.body.as_ref().map(|body| body.duplicate()),
            services: Arc::clone(&self.services),
        })
    }
}
