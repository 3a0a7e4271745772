//! Error taxonomy for compilation, capability lookup, and execution.
//!
//! Compilation failures are structural and synchronous; nothing is swallowed
//! and no partial tree escapes a failed `compile`. Execution failures always
//! carry the label of the action that was active when they happened, with the
//! original cause chained underneath.

use thiserror::Error;

/// Failure while turning configuration into an action tree.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The registry has no entry under this name.
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    /// Top-level configuration is neither a string, a sequence, nor a mapping.
    #[error("configuration must be an action name, a sequence, or a mapping")]
    InvalidConfiguration,

    /// A mapping's first key does not name a registered action.
    #[error("no registered action matches key '{0}'")]
    NoMatchingAction(String),

    /// A node rejected its own configuration. The node's error is opaque to
    /// the compiler and kept intact as the source; only the action name is
    /// added for provenance.
    #[error("failed to configure action '{action}'")]
    Configure {
        action: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure during action execution or expression evaluation.
///
/// This is the single wrapper for everything that can go wrong while a tree
/// runs: capability lookup, lazy parsing, evaluation, and the actions' own
/// failures. It always names the owning action and preserves the cause chain.
#[derive(Debug, Error)]
#[error("action '{action}' failed: {message}")]
pub struct ExecutionError {
    /// Label of the action that was executing when the failure occurred.
    pub action: String,
    /// Rendering of the original failure.
    pub message: String,
    /// The original cause, when one exists.
    #[source]
    pub source: Option<anyhow::Error>,
}

impl ExecutionError {
    /// Wraps an underlying failure with the owning action's label.
    pub fn new(action: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            action: action.into(),
            message: cause.to_string(),
            source: Some(cause),
        }
    }

    /// A failure originating in the action itself, with no deeper cause.
    pub fn message(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
            source: None,
        }
    }
}

/// Failure looking up a capability in the service container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No capability registered under the key.
    #[error("no capability registered under '{0}'")]
    Missing(String),

    /// A capability exists under the key but has a different type.
    #[error("capability '{0}' does not have the expected type")]
    WrongType(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn execution_error_preserves_the_cause_chain() {
        let cause = anyhow!("parse failed").context("while tokenizing");
        let error = ExecutionError::new("if", cause);

        assert_eq!(error.action, "if");
        assert_eq!(error.message, "while tokenizing");
        let source = std::error::Error::source(&error).expect("source present");
        assert_eq!(source.to_string(), "while tokenizing");
        assert_eq!(source.source().expect("root cause").to_string(), "parse failed");
    }

    #[test]
    fn message_only_errors_have_no_source() {
        let error = ExecutionError::message("while", "loop exceeded 10 iterations");
        assert!(std::error::Error::source(&error).is_none());
        assert_eq!(error.to_string(), "action 'while' failed: loop exceeded 10 iterations");
    }

    #[test]
    fn configure_errors_name_the_action() {
        let error = CompileError::Configure {
            action: "include".into(),
            source: anyhow!("no such file"),
        };
        assert_eq!(error.to_string(), "failed to configure action 'include'");
        assert_eq!(
            std::error::Error::source(&error).expect("source").to_string(),
            "no such file"
        );
    }
}
