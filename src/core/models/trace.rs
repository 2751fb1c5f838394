use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::operation::Operation;

/// Raw result of one command: exit code and both output streams.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// One recorded command attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub rc: i32,
    pub stdout: String,
    pub stderr: String,
    /// The command line as it was run, for diagnostics.
    pub command: String,
}

impl AttemptRecord {
    pub fn succeeded(&self) -> bool {
        self.rc == 0
    }
}

/// All attempts of a single operation, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationLog {
    pub tries: Vec<AttemptRecord>,
    pub num_tries: usize,
}

/// Every attempt made during one run, grouped by operation name.
///
/// Append-only: records are never removed or rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptTrace {
    operations: BTreeMap<String, OperationLog>,
}

impl AttemptTrace {
    /// Append an attempt and return a copy of the stored record.
    pub fn record(
        &mut self,
        operation: Operation,
        command: String,
        output: CommandOutput,
    ) -> AttemptRecord {
        let record = AttemptRecord {
            rc: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            command,
        };
        let log = self
            .operations
            .entry(operation.name().to_string())
            .or_default();
        log.tries.push(record.clone());
        log.num_tries += 1;
        record
    }

    /// Total number of attempts across all operations.
    pub fn total(&self) -> usize {
        self.operations.values().map(|log| log.num_tries).sum()
    }

    /// Every recorded attempt, grouped by operation name.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &[AttemptRecord])> {
        self.operations
            .iter()
            .map(|(name, log)| (name.as_str(), log.tries.as_slice()))
    }

    /// Operation names in the trace with their attempt counts.
    pub fn summary(&self) -> impl Iterator<Item = (&str, usize)> {
        self.operations
            .iter()
            .map(|(name, log)| (name.as_str(), log.num_tries))
    }
}

#[cfg(test)]
impl AttemptTrace {
    /// Attempts recorded for `operation`, oldest first.
    pub fn attempts(&self, operation: Operation) -> &[AttemptRecord] {
        self.operations
            .get(operation.name())
            .map(|log| log.tries.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.operations
            .get(operation.name())
            .map_or(0, |log| log.num_tries)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
