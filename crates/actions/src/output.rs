//! Interpolated text output.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use stagehand_engine::{Action, Compiler, ExecutionError, ServiceContainer};
use stagehand_types::{ConfigValue, ExecutionContext};

use crate::template::Template;

/// `{echo: <template>}`
///
/// Interpolates `${{ … }}` expressions into the text, writes the line to
/// stdout, and yields the rendered string.
#[derive(Default)]
pub struct EchoAction {
    template: Template,
    services: Arc<ServiceContainer>,
}

impl Action for EchoAction {
    fn label(&self) -> &str {
        "echo"
    }

    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        self.services = Arc::clone(compiler.services());
        let text = config
            .get("echo")
            .and_then(ConfigValue::as_str)
            .context("'echo' requires a text template")?;
        self.template = Template::parse(text);
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let line = self.template.render("echo", &self.services, context)?;
        debug!(line = %line, "echo");
        println!("{line}");
        Ok(Value::String(line))
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(EchoAction {
            template: self.template.clone(),
            services: Arc::clone(&self.services),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{standard_registry, standard_services};
    use serde_json::json;

    #[test]
    fn renders_and_returns_the_line() {
        let registry = standard_registry();
        let compiler = Compiler::new(&registry, Arc::new(standard_services()));
        let config: ConfigValue = serde_yaml::from_str("{echo: \"hello ${{ name }}\"}").expect("valid yaml");
        let mut tree = compiler.compile(&config).expect("compiles");

        let mut context = ExecutionContext::new();
        context.set("name", json!("world"));
        assert_eq!(tree.execute(&mut context).unwrap(), json!("hello world"));
    }

    #[test]
    fn requires_a_string_template() {
        let registry = standard_registry();
        let compiler = Compiler::new(&registry, Arc::new(standard_services()));
        let config: ConfigValue = serde_yaml::from_str("{echo: {nested: true}}").expect("valid yaml");
        assert!(compiler.compile(&config).is_err());
    }
}
