//! Shared type definitions for the stagehand action engine.
//!
//! Everything in this crate sits on the contract boundary between the engine
//! core and its collaborators: the configuration tree handed to the compiler,
//! the token vocabulary exchanged between the expression parser and the
//! evaluator, and the runtime context that actions execute against.

pub mod context;
pub mod token;
pub mod value;

pub use context::ExecutionContext;
pub use token::{Token, TokenSequence};
pub use value::{display_value, is_truthy};

/// Configuration tree describing what action tree to build.
///
/// Configuration is YAML-sourced: a string is a bare action reference, a
/// sequence is an ordered series, and a mapping names an action via its first
/// key. Any other scalar is rejected by the compiler.
pub type ConfigValue = serde_yaml::Value;
