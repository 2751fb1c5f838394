use std::path::PathBuf;

use crate::core::models::outcome::Action;
use crate::core::models::trace::AttemptTrace;

/// All domain errors for gpg-reconcile.
///
/// Configuration problems are raised before any command runs. Everything
/// that happens after the first command is either recorded in the trace or
/// surfaced as a `TerminalFailure` carrying that trace.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(
        "Invalid configuration: {detail}\n\n  \
         Nothing was executed. Fix the option and run again.\n  \
         Run 'gpg-reconcile apply --help' to see all options."
    )]
    InvalidConfig { detail: String },

    #[error(
        "Key management binary not found: {name}\n\n  \
         Solutions:\n    \
         → Install GnuPG (e.g. apt install gnupg)\n    \
         → Point to an existing binary: --gpg /path/to/gpg"
    )]
    BinaryNotFound { name: String },

    #[error(
        "Command for '{operation}' still has an unresolved {placeholder} placeholder\n\n  \
         This is a bug in gpg-reconcile, not in your configuration."
    )]
    UnresolvedPlaceholder {
        operation: String,
        placeholder: &'static str,
    },

    #[error("Failed to start {program}: {reason}")]
    CommandSpawn { program: PathBuf, reason: String },

    #[error(
        "Operation '{operation}' failed after all attempts\n\n  \
         See the attempt trace for the exit code and output of every try.\n  \
         Solutions:\n    \
         → Add more keyservers: --server keys.example.org\n    \
         → Raise the retry count: --tries 5"
    )]
    TerminalFailure {
        operation: String,
        /// The action that was being carried out.
        action: Action,
        trace: AttemptTrace,
    },

    #[error("Trace log error: {detail}")]
    TraceLog { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReconcileError {
    /// The attempt trace accumulated before the failure, when there is one.
    pub fn trace(&self) -> Option<&AttemptTrace> {
        match self {
            Self::TerminalFailure { trace, .. } => Some(trace),
            _ => None,
        }
    }

    /// The action a failed run had chosen, when it got that far.
    pub fn action(&self) -> Option<Action> {
        match self {
            Self::TerminalFailure { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Process exit status the CLI reports for this error.
    ///
    /// Anything rejected before the engine starts exits with 2, failures
    /// detected while converging exit with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig { .. } | Self::BinaryNotFound { .. } => 2,
            _ => 1,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_two() {
        let err = ReconcileError::InvalidConfig {
            detail: "tries must be at least 1".into(),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.trace().is_none());
        assert!(err.action().is_none());
    }

    #[test]
    fn terminal_failure_keeps_trace() {
        let err = ReconcileError::TerminalFailure {
            operation: "receive".into(),
            action: Action::Receive,
            trace: AttemptTrace::default(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.trace().is_some());
        assert_eq!(err.action(), Some(Action::Receive));
        assert!(err.to_string().contains("'receive'"));
    }
}
