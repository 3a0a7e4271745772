//! Action registry: name → instantiation-strategy bindings.

use indexmap::IndexMap;
use tracing::debug;

use crate::action::Action;
use crate::error::CompileError;

/// No-argument constructor for a registered action type.
pub type ConstructorFn = fn() -> Box<dyn Action>;

/// Factory invoked with the registry itself, so factories can resolve other
/// names while building their result.
pub type FactoryFn = Box<dyn Fn(&ActionRegistry) -> Result<Box<dyn Action>, CompileError> + Send + Sync>;

/// How a registered name is turned into a live action instance.
///
/// Exactly one strategy is active per name; `resolve` dispatches over the
/// three variants exhaustively.
pub enum ActionEntry {
    /// Construct a fresh instance from the type's no-argument constructor.
    Constructor(ConstructorFn),
    /// Invoke the factory and return its result unchanged.
    Factory(FactoryFn),
    /// Structurally duplicate a stored live instance.
    Prototype(Box<dyn Action>),
}

/// Name-keyed action bindings.
///
/// The registry is configured once at setup and outlives every tree it
/// produces. Registration order is preserved so diagnostic listings stay
/// deterministic. Concurrent mutation requires external synchronization.
#[derive(Default)]
pub struct ActionRegistry {
    entries: IndexMap<String, ActionEntry>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `entry`, replacing any existing binding.
    pub fn register(&mut self, name: impl Into<String>, entry: ActionEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Binds `name` to a no-argument constructor.
    pub fn register_constructor(&mut self, name: impl Into<String>, constructor: ConstructorFn) {
        self.register(name, ActionEntry::Constructor(constructor));
    }

    /// Binds `name` to a factory function.
    pub fn register_factory<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ActionRegistry) -> Result<Box<dyn Action>, CompileError> + Send + Sync + 'static,
    {
        self.register(name, ActionEntry::Factory(Box::new(factory)));
    }

    /// Binds `name` to a prototype instance that is duplicated on resolve.
    pub fn register_prototype(&mut self, name: impl Into<String>, prototype: Box<dyn Action>) {
        self.register(name, ActionEntry::Prototype(prototype));
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Produces a live instance for `name`.
    ///
    /// Constructor entries yield a fresh instance per call, factories are
    /// handed the registry itself, and prototypes are duplicated so later
    /// mutation of either copy leaves the other untouched.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Action>, CompileError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| CompileError::UnknownAction(name.to_string()))?;

        let node = match entry {
            ActionEntry::Constructor(constructor) => constructor(),
            ActionEntry::Factory(factory) => factory(self)?,
            ActionEntry::Prototype(prototype) => prototype.duplicate(),
        };
        debug!(action = name, "resolved action");
        Ok(node)
    }
}
