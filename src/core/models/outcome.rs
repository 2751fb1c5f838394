use std::fmt;

use serde::{Deserialize, Serialize};

use super::operation::Operation;
use super::trace::AttemptTrace;

/// The single action chosen to move the keyring towards the desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoOp,
    Delete,
    Refresh,
    Receive,
    ImportFromFile,
}

impl Action {
    /// Operation that carries out this action, `None` for `NoOp`.
    pub fn operation(self) -> Option<Operation> {
        match self {
            Self::NoOp => None,
            Self::Delete => Some(Operation::Delete),
            Self::Refresh => Some(Operation::Refresh),
            Self::Receive => Some(Operation::Receive),
            Self::ImportFromFile => Some(Operation::Import),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoOp => "no-op",
            Self::Delete => "delete",
            Self::Refresh => "refresh",
            Self::Receive => "receive",
            Self::ImportFromFile => "import-from-file",
        };
        f.pad(s)
    }
}

/// Output of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub changed: bool,
    pub action: Action,
    pub trace: AttemptTrace,
}

/// Output of a probe-only run: what is there and what `apply` would do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub present: bool,
    /// Identity probed for, `None` when a key file yielded no identity.
    pub identity: Option<String>,
    pub planned: Action,
    pub trace: AttemptTrace,
}
