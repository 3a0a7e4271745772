//! Synchronous command execution.

use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use tracing::{debug, info};

use stagehand_engine::{Action, Compiler, ExecutionError, ServiceContainer};
use stagehand_types::{ConfigValue, ExecutionContext};

use crate::template::Template;

/// `{exec: <command template>, capture: <name>, check: <bool>}`
///
/// Interpolates the command line, splits it shell-style (single and double
/// quotes, backslash escapes), runs the program synchronously, and yields
/// `{status, stdout, stderr}`. `capture` additionally stores that result in
/// the context; `check` (default true) turns a non-zero exit into an error.
#[derive(Default)]
pub struct ExecAction {
    command: Template,
    capture: Option<String>,
    check: bool,
    services: Arc<ServiceContainer>,
}

impl Action for ExecAction {
    fn label(&self) -> &str {
        "exec"
    }

    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        self.services = Arc::clone(compiler.services());
        let line = config
            .get("exec")
            .and_then(ConfigValue::as_str)
            .context("'exec' requires a command template")?;
        self.command = Template::parse(line);
        self.capture = match config.get("capture") {
            Some(name) => Some(
                name.as_str()
                    .map(str::to_string)
                    .context("'capture' must be a variable name")?,
            ),
            None => None,
        };
        self.check = match config.get("check") {
            Some(flag) => flag.as_bool().context("'check' must be a boolean")?,
            None => true,
        };
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        let line = self.command.render("exec", &self.services, context)?;
        let argv = split_command_line(&line).map_err(|cause| ExecutionError::new("exec", cause))?;
        let Some((program, arguments)) = argv.split_first() else {
            return Err(ExecutionError::message("exec", "command line is empty"));
        };

        info!(command = %line, "running command");
        let output = Command::new(program)
            .args(arguments)
            .output()
            .map_err(|error| ExecutionError::new("exec", anyhow!(error).context(format!("failed to run '{program}'"))))?;

        let status = output.status.code().unwrap_or(-1);
        let result = json!({
            "status": status,
            "stdout": String::from_utf8_lossy(&output.stdout).trim_end_matches('\n'),
            "stderr": String::from_utf8_lossy(&output.stderr).trim_end_matches('\n'),
        });
        debug!(status, "command finished");

        if let Some(name) = &self.capture {
            context.set(name.clone(), result.clone());
        }
        if self.check && !output.status.success() {
            return Err(ExecutionError::message(
                "exec",
                format!("command '{program}' exited with status {status}"),
            ));
        }
        Ok(result)
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(ExecAction {
            command: self.command.clone(),
            capture: self.capture.clone(),
            check: self.check,
            services: Arc::clone(&self.services),
        })
    }
}

/// Splits a rendered command line into argv, honouring single and double
/// quotes and backslash escapes. Quotes are stripped from the tokens.
fn split_command_line(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(character) = chars.next() {
        match character {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    bail!("dangling backslash at end of command line");
                };
                current.push(escaped);
                in_token = true;
            }
            c if Some(c) == quote => quote = None,
            '\'' | '"' if quote.is_none() => {
                quote = Some(character);
                in_token = true;
            }
            c if c.is_whitespace() && quote.is_none() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            other => {
                current.push(other);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        bail!("unterminated quote in command line");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
