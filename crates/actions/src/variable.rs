//! Context variable assignment.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

use stagehand_engine::{Action, Compiler, ExecutionError, Expression, ServiceContainer};
use stagehand_types::{ConfigValue, ExecutionContext};

/// `{set: {<name>: <expression-or-literal>, …}}`
///
/// Evaluates each entry in document order and stores the result in the
/// context. String values are expressions; quote inside the string for a
/// string literal (`greeting: "'hello'"`). Every other YAML value is stored
/// as the equivalent JSON literal.
#[derive(Default)]
pub struct SetAction {
    assignments: Vec<(String, ValueSource)>,
    services: Arc<ServiceContainer>,
}

#[derive(Debug, Clone)]
enum ValueSource {
    Evaluated(Expression),
    Literal(Value),
}

impl Action for SetAction {
    fn label(&self) -> &str {
        "set"
    }

    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        self.services = Arc::clone(compiler.services());
        let body = config.get("set").context("'set' requires a mapping of assignments")?;
        let ConfigValue::Mapping(entries) = body else {
            bail!("'set' requires a mapping of assignments");
        };

        for (key, value) in entries {
            let Some(name) = key.as_str() else {
                bail!("variable names must be strings");
            };
            let source = match value {
                ConfigValue::String(expression) => ValueSource::Evaluated(Expression::text(expression)),
                literal => ValueSource::Literal(
                    serde_json::to_value(literal).context("assignment value is not representable as JSON")?,
                ),
            };
            self.assignments.push((name.to_string(), source));
        }
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let mut last = Value::Null;
        for (name, source) in &self.assignments {
            let value = match source {
                ValueSource::Evaluated(expression) => expression.evaluate("set", &self.services, context)?,
                ValueSource::Literal(value) => value.clone(),
            };
            debug!(variable = %name, "set variable");
            context.set(name.clone(), value.clone());
            last = value;
        }
        Ok(last)
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(SetAction {
            assignments: self.assignments.clone(),
            services: Arc::clone(&self.services),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{standard_registry, standard_services};
    use serde_json::json;

    fn run(source: &str, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let registry = standard_registry();
        let compiler = Compiler::new(&registry, Arc::new(standard_services()));
        let config: ConfigValue = serde_yaml::from_str(source).expect("valid yaml");
        let mut tree = compiler.compile(&config).expect("compiles");
        tree.execute(context)
    }

    #[test]
    fn string_values_are_expressions() {
        let mut context = ExecutionContext::new();
        context.set("base", json!(40));
        let result = run("{set: {total: \"base + 2\"}}", &mut context).unwrap();
        assert_eq!(result, json!(42));
        assert_eq!(context.get("total"), Some(&json!(42)));
    }

    #[test]
    fn non_string_values_are_literals() {
        let mut context = ExecutionContext::new();
        run("{set: {count: 0, flags: [a, b], enabled: true}}", &mut context).unwrap();
        assert_eq!(context.get("count"), Some(&json!(0)));
        assert_eq!(context.get("flags"), Some(&json!(["a", "b"])));
        assert_eq!(context.get("enabled"), Some(&json!(true)));
    }

    #[test]
    fn assignments_apply_in_document_order() {
        let mut context = ExecutionContext::new();
        run("{set: {a: 1, b: \"a + 1\", c: \"b + 1\"}}", &mut context).unwrap();
        assert_eq!(context.get("c"), Some(&json!(3)));
    }

    #[test]
    fn set_requires_a_mapping() {
        let registry = standard_registry();
        let compiler = Compiler::new(&registry, Arc::new(standard_services()));
        let config: ConfigValue = serde_yaml::from_str("{set: [a, b]}").expect("valid yaml");
        assert!(compiler.compile(&config).is_err());
    }
}
