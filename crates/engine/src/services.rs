//! String-keyed capability container.
//!
//! Actions resolve their collaborators, most importantly the expression
//! parser and evaluator, through this container at evaluation time, so
//! embedding applications can swap either without touching the engine. Lookup
//! failures are ordinary [`ServiceError`]s; the expression bridge folds them
//! into its uniform execution error like any other failure.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ServiceError;
use crate::expression::{ExpressionEvaluator, ExpressionParser};

/// Key under which the parser capability is registered.
pub const PARSER_KEY: &str = "parser";
/// Key under which the evaluator capability is registered.
pub const EVALUATOR_KEY: &str = "evaluator";

/// Capability registry keyed by name.
///
/// Entries are stored type-erased; `get` recovers them by downcasting to the
/// requested type, so a key bound to the wrong type is reported rather than
/// silently ignored.
#[derive(Default)]
pub struct ServiceContainer {
    entries: IndexMap<String, Box<dyn Any + Send + Sync>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a container with the two capabilities the expression bridge
    /// requires.
    pub fn with_expression_engine(
        parser: Arc<dyn ExpressionParser>,
        evaluator: Arc<dyn ExpressionEvaluator>,
    ) -> Self {
        let mut container = Self::new();
        container.register(PARSER_KEY, parser);
        container.register(EVALUATOR_KEY, evaluator);
        container
    }

    /// Registers a capability, replacing any existing entry under the key.
    pub fn register<T: Any + Send + Sync>(&mut self, key: impl Into<String>, capability: T) {
        self.entries.insert(key.into(), Box::new(capability));
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up a capability by key and concrete type.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Result<T, ServiceError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| ServiceError::Missing(key.to_string()))?;
        entry
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ServiceError::WrongType(key.to_string()))
    }

    /// The parser capability under [`PARSER_KEY`].
    pub fn parser(&self) -> Result<Arc<dyn ExpressionParser>, ServiceError> {
        self.get(PARSER_KEY)
    }

    /// The evaluator capability under [`EVALUATOR_KEY`].
    pub fn evaluator(&self) -> Result<Arc<dyn ExpressionEvaluator>, ServiceError> {
        self.get(EVALUATOR_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::Value;
    use stagehand_types::{ExecutionContext, TokenSequence};

    struct NullParser;

    impl ExpressionParser for NullParser {
        fn parse(&self, _source: &str) -> Result<TokenSequence> {
            Ok(Vec::new())
        }
    }

    struct NullEvaluator;

    impl ExpressionEvaluator for NullEvaluator {
        fn evaluate(&self, _tokens: &TokenSequence, _context: &mut ExecutionContext) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn missing_key_is_reported() {
        let container = ServiceContainer::new();
        let error = container.parser().err().unwrap();
        assert_eq!(error, ServiceError::Missing("parser".into()));
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut container = ServiceContainer::new();
        container.register(PARSER_KEY, "not a parser".to_string());
        let error = container.parser().err().unwrap();
        assert_eq!(error, ServiceError::WrongType("parser".into()));
    }

    #[test]
    fn registered_capabilities_resolve() {
        let container = ServiceContainer::with_expression_engine(Arc::new(NullParser), Arc::new(NullEvaluator));
        assert!(container.has(PARSER_KEY));
        assert!(container.parser().is_ok());
        assert!(container.evaluator().is_ok());
    }

    #[test]
    fn registration_replaces_existing_entries() {
        let mut container = ServiceContainer::new();
        container.register("limit", 4u32);
        container.register("limit", 8u32);
        assert_eq!(container.get::<u32>("limit").unwrap(), 8);
    }
}
