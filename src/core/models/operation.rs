use std::fmt;

use serde::{Deserialize, Serialize};

/// Every command the engine can run against the key-management tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// List the key by identity, any kind.
    Check,
    /// List the key in the secret keyring.
    CheckPrivate,
    /// List the key in the public keyring.
    CheckPublic,
    Delete,
    /// Refresh the key from a keyserver.
    Refresh,
    /// Receive the key from a keyserver.
    Receive,
    /// Import the key from the local key file.
    Import,
    /// Dry-run import of the local key file, used to learn its identity.
    Inspect,
}

impl Operation {
    /// Name used as the key in the attempt trace.
    pub fn name(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::CheckPrivate => "check_private",
            Self::CheckPublic => "check_public",
            Self::Delete => "delete",
            Self::Refresh => "refresh",
            Self::Receive => "receive",
            Self::Import => "import",
            Self::Inspect => "inspect",
        }
    }

    /// Operations that talk to a keyserver and go through the retry loop.
    pub fn needs_endpoint(self) -> bool {
        matches!(self, Self::Refresh | Self::Receive)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_keyserver_operations_need_an_endpoint() {
        let bound: Vec<Operation> = [
            Operation::Check,
            Operation::CheckPrivate,
            Operation::CheckPublic,
            Operation::Delete,
            Operation::Refresh,
            Operation::Receive,
            Operation::Import,
            Operation::Inspect,
        ]
        .into_iter()
        .filter(|op| op.needs_endpoint())
        .collect();
        assert_eq!(bound, vec![Operation::Refresh, Operation::Receive]);
    }

    #[test]
    fn serde_name_matches_trace_name() {
        let json = serde_json::to_string(&Operation::CheckPrivate).unwrap();
        assert_eq!(json, format!("\"{}\"", Operation::CheckPrivate.name()));
    }
}
