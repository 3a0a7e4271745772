//! Lazy expression evaluation bridge.
//!
//! Actions hold [`Expression`]s for every embedded expression in their
//! configuration. Nothing is parsed at configure time: the first `evaluate`
//! call obtains the parser capability, tokenizes the source text, and caches
//! the sequence, so repeated evaluation parses at most once. Pre-tokenized
//! sources skip the parser entirely.
//!
//! Every failure on this path (capability lookup, parsing, evaluation) is
//! folded into a single [`ExecutionError`] naming the action that asked for
//! the value, with the original cause chained underneath.

use anyhow::Result;
use once_cell::sync::OnceCell;
use serde_json::Value;
use stagehand_types::{ConfigValue, ExecutionContext, TokenSequence};

use crate::error::ExecutionError;
use crate::services::ServiceContainer;

/// Turns raw expression text into a token sequence.
pub trait ExpressionParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<TokenSequence>;
}

/// Evaluates a token sequence against the execution context.
///
/// Evaluation may mutate the context; assignment expressions do.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, tokens: &TokenSequence, context: &mut ExecutionContext) -> Result<Value>;
}

/// Where an expression's tokens come from.
#[derive(Debug, Clone)]
pub enum ExpressionSource {
    /// Raw text, tokenized lazily on first evaluation.
    Text(String),
    /// A pre-tokenized sequence, passed through unchanged.
    Tokens(TokenSequence),
}

/// An embedded expression, parsed on demand.
#[derive(Debug, Clone)]
pub struct Expression {
    source: ExpressionSource,
    parsed: OnceCell<TokenSequence>,
}

impl Expression {
    /// An expression backed by raw text.
    pub fn text(source: impl Into<String>) -> Self {
        Self {
            source: ExpressionSource::Text(source.into()),
            parsed: OnceCell::new(),
        }
    }

    /// An expression backed by an already-tokenized sequence.
    pub fn tokens(tokens: TokenSequence) -> Self {
        Self {
            source: ExpressionSource::Tokens(tokens),
            parsed: OnceCell::new(),
        }
    }

    /// Reads an expression out of a configuration value, which must be a
    /// string.
    pub fn from_config(config: &ConfigValue) -> Result<Self> {
        match config.as_str() {
            Some(source) => Ok(Self::text(source)),
            None => anyhow::bail!("expected an expression string"),
        }
    }

    /// The raw text, when this expression was built from text.
    pub fn source_text(&self) -> Option<&str> {
        match &self.source {
            ExpressionSource::Text(source) => Some(source),
            ExpressionSource::Tokens(_) => None,
        }
    }

    /// Evaluates against `context`, naming `action` in any failure.
    pub fn evaluate(
        &self,
        action: &str,
        services: &ServiceContainer,
        context: &mut ExecutionContext,
    ) -> Result<Value, ExecutionError> {
        self.try_evaluate(services, context)
            .map_err(|cause| ExecutionError::new(action, cause))
    }

    fn try_evaluate(&self, services: &ServiceContainer, context: &mut ExecutionContext) -> Result<Value> {
        let tokens = self.resolve_tokens(services)?;
        let evaluator = services.evaluator()?;
        evaluator.evaluate(tokens, context)
    }

    /// Returns the token sequence, tokenizing text sources exactly once.
    fn resolve_tokens(&self, services: &ServiceContainer) -> Result<&TokenSequence> {
        match &self.source {
            ExpressionSource::Tokens(tokens) => Ok(tokens),
            ExpressionSource::Text(source) => self.parsed.get_or_try_init(|| {
                let parser = services.parser()?;
                parser.parse(source)
            }),
        }
    }
}

impl Default for Expression {
    fn default() -> Self {
        Self::text("")
    }
}
