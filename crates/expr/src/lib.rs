//! Default expression engine for stagehand.
//!
//! A deliberately small language: literals, context variable paths with
//! `.field` and `[index]` navigation, equality and ordering comparisons,
//! boolean connectives, additive arithmetic, and assignment into the
//! execution context. The [`Lexer`] implements the engine's parser
//! capability, the [`Interpreter`] its evaluator capability; both are
//! registered through the service container, so embedding applications can
//! replace either independently.

pub mod interp;
pub mod lexer;

pub use interp::Interpreter;
pub use lexer::{Lexer, tokenize};

use stagehand_engine::ServiceContainer;
use std::sync::Arc;

/// A service container wired with the default lexer and interpreter.
pub fn default_services() -> ServiceContainer {
    ServiceContainer::with_expression_engine(Arc::new(Lexer), Arc::new(Interpreter))
}
