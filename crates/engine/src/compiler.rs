//! Tree compiler: configuration shape → action tree.
//!
//! The compiler only ever takes the first step. It decides whether the
//! top-level configuration denotes an empty no-op, a bare action reference,
//! an ordered series, or a single mapping-configured action, instantiates the
//! node through the registry, and hands the node its own raw configuration.
//! Composite and parameterized nodes compile their nested configuration by
//! calling back into the compiler from `configure`, which is how the tree
//! recurses without the compiler walking it.

use std::sync::Arc;

use tracing::debug;

use stagehand_types::ConfigValue;

use crate::action::Action;
use crate::builtin::{Noop, Series};
use crate::error::CompileError;
use crate::registry::ActionRegistry;
use crate::services::ServiceContainer;

/// Compiles configuration trees against a registry and a capability
/// container.
///
/// The compiler borrows the registry for its lifetime and hands each
/// configured node a shared handle to the services, which nodes keep for
/// expression evaluation at execution time.
pub struct Compiler<'r> {
    registry: &'r ActionRegistry,
    services: Arc<ServiceContainer>,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r ActionRegistry, services: Arc<ServiceContainer>) -> Self {
        Self { registry, services }
    }

    pub fn registry(&self) -> &ActionRegistry {
        self.registry
    }

    pub fn services(&self) -> &Arc<ServiceContainer> {
        &self.services
    }

    /// Builds an action tree from `config`.
    ///
    /// Dispatch, in order:
    ///
    /// 1. empty string, empty sequence, or empty mapping → [`Noop`]
    /// 2. non-empty string → bare reference, resolved and configured with
    ///    `Null`
    /// 3. sequence → [`Series`] configured with the whole list
    /// 4. mapping → the first key names the action; the node is configured
    ///    with the entire mapping, remaining keys acting as its parameters
    /// 5. anything else → [`CompileError::InvalidConfiguration`]
    ///
    /// A failed `configure` aborts the whole call with that node's error; no
    /// partial tree is returned.
    pub fn compile(&self, config: &ConfigValue) -> Result<Box<dyn Action>, CompileError> {
        if config_is_empty(config) {
            debug!("compiled empty configuration to noop");
            return Ok(Box::new(Noop));
        }

        match config {
            ConfigValue::String(name) => {
                debug!(action = %name, "compiling bare action reference");
                let node = self.registry.resolve(name)?;
                self.configured(node, &ConfigValue::Null)
            }
            ConfigValue::Sequence(items) => {
                debug!(children = items.len(), "compiling sequence into series");
                self.configured(Box::new(Series::default()), config)
            }
            ConfigValue::Mapping(mapping) => {
                let Some((first_key, _)) = mapping.iter().next() else {
                    return Ok(Box::new(Noop));
                };
                let Some(name) = first_key.as_str() else {
                    return Err(CompileError::NoMatchingAction(key_display(first_key)));
                };
                if !self.registry.has(name) {
                    return Err(CompileError::NoMatchingAction(name.to_string()));
                }
                debug!(action = name, keys = mapping.len(), "compiling mapping-configured action");
                let node = self.registry.resolve(name)?;
                self.configured(node, config)
            }
            _ => Err(CompileError::InvalidConfiguration),
        }
    }

    fn configured(&self, mut node: Box<dyn Action>, config: &ConfigValue) -> Result<Box<dyn Action>, CompileError> {
        if let Err(source) = node.configure(self, config) {
            return Err(CompileError::Configure {
                action: node.label().to_string(),
                source,
            });
        }
        Ok(node)
    }
}

/// An empty string, sequence, or mapping compiles to a no-op rather than an
/// error.
fn config_is_empty(config: &ConfigValue) -> bool {
    match config {
        ConfigValue::String(text) => text.is_empty(),
        ConfigValue::Sequence(items) => items.is_empty(),
        ConfigValue::Mapping(mapping) => mapping.is_empty(),
        _ => false,
    }
}

fn key_display(key: &ConfigValue) -> String {
    match key {
        ConfigValue::String(text) => text.clone(),
        ConfigValue::Bool(flag) => flag.to_string(),
        ConfigValue::Number(number) => number.to_string(),
        _ => "<non-scalar key>".to_string(),
    }
}
