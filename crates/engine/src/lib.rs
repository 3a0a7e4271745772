//! # Stagehand Engine
//!
//! The engine compiles declarative configuration into a tree of executable
//! action nodes and resolves embedded expressions lazily while that tree runs.
//!
//! ## Architecture
//!
//! - **`registry`**: name → instantiation-strategy bindings (constructor,
//!   factory, or prototype) resolved to live [`Action`] instances
//! - **`compiler`**: shape dispatch over a configuration tree (bare name,
//!   empty, sequence, or first-key mapping) with recursion delegated to each
//!   node's own `configure`
//! - **`expression`**: the lazy bridge between actions and the pluggable
//!   parser/evaluator capabilities, with uniform failure provenance
//! - **`services`**: string-keyed capability container supplying those
//!   collaborators
//! - **`builtin`**: the two structural nodes the compiler itself emits
//!   ([`Noop`] and [`Series`])
//!
//! ## Usage
//!
//! ```rust
//! use stagehand_engine::{ActionRegistry, Compiler, Noop, ServiceContainer};
//! use stagehand_types::ExecutionContext;
//! use std::sync::Arc;
//!
//! let mut registry = ActionRegistry::new();
//! registry.register_constructor("noop", || Box::new(Noop));
//!
//! let compiler = Compiler::new(&registry, Arc::new(ServiceContainer::new()));
//! let config = serde_yaml::from_str("[noop, noop]").unwrap();
//! let mut tree = compiler.compile(&config).unwrap();
//!
//! let mut context = ExecutionContext::new();
//! let result = tree.execute(&mut context).unwrap();
//! assert!(result.is_null());
//! ```

pub mod action;
pub mod builtin;
pub mod compiler;
pub mod error;
pub mod expression;
pub mod registry;
pub mod services;

pub use action::Action;
pub use builtin::{Noop, Series};
pub use compiler::Compiler;
pub use error::{CompileError, ExecutionError, ServiceError};
pub use expression::{Expression, ExpressionEvaluator, ExpressionParser, ExpressionSource};
pub use registry::{ActionEntry, ActionRegistry};
pub use services::{EVALUATOR_KEY, PARSER_KEY, ServiceContainer};
