//! Nested script inclusion.

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

use stagehand_engine::{Action, Compiler, ExecutionError};
use stagehand_types::{ConfigValue, ExecutionContext};

/// Includes deeper than this are assumed to be cyclic.
const MAX_INCLUDE_DEPTH: usize = 16;

thread_local! {
    static INCLUDE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// `{include: <path>}`
///
/// Reads a YAML script at configure time and compiles it through the same
/// compiler, so the included tree is a child like any other. Executing the
/// action runs that tree against the caller's context.
#[derive(Default)]
pub struct IncludeAction {
    path: PathBuf,
    tree: Option<Box<dyn Action>>,
}

impl Action for IncludeAction {
    fn label(&self) -> &str {
        "include"
    }

    fn configure(&mut self, compiler: &Compiler<'_>, config: &ConfigValue) -> Result<()> {
        let path = config
            .get("include")
            .and_then(ConfigValue::as_str)
            .context("'include' requires a script path")?;
        self.path = PathBuf::from(path);

        let depth = INCLUDE_DEPTH.with(|depth| depth.get());
        if depth >= MAX_INCLUDE_DEPTH {
            bail!("include nesting exceeds {MAX_INCLUDE_DEPTH} levels; is '{path}' including itself?");
        }

        let source =
            fs::read_to_string(&self.path).with_context(|| format!("failed to read include script '{path}'"))?;
        let document: ConfigValue =
            serde_yaml::from_str(&source).with_context(|| format!("failed to parse include script '{path}'"))?;

        INCLUDE_DEPTH.with(|counter| counter.set(depth + 1));
        let compiled = compiler.compile(&document);
        INCLUDE_DEPTH.with(|counter| counter.set(depth));

        self.tree = Some(compiled?);
        debug!(path = %self.path.display(), "include compiled");
        Ok(())
    }

    fn execute(&mut self, context: &mut ExecutionContext) -> Result<Value, ExecutionError> {
        match self.tree.as_mut() {
            Some(tree) => tree.execute(context),
            None => Ok(Value::Null),
        }
    }

    fn duplicate(&self) -> Box<dyn Action> {
        Box::new(IncludeAction {
            path: self.path.clone(),
            tree: self.tree.as_ref().map(|tree| tree.duplicate()),
        })
    }
}
