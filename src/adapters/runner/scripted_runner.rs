//! Test doubles for the command runner and sleeper ports.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::core::errors::Result;
use crate::core::models::trace::CommandOutput;
use crate::core::services::command_templates::ResolvedCommand;
use crate::core::traits::command_runner::CommandRunner;
use crate::core::traits::sleeper::Sleeper;

/// Runner that records commands and replays pre-configured outputs in order.
///
/// Once the script runs out every command "succeeds" with empty output.
pub struct ScriptedRunner {
    outputs: RefCell<VecDeque<CommandOutput>>,
    executed: RefCell<Vec<ResolvedCommand>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::with_outputs(Vec::new())
    }

    pub fn with_outputs(outputs: Vec<CommandOutput>) -> Self {
        Self {
            outputs: RefCell::new(outputs.into()),
            executed: RefCell::new(Vec::new()),
        }
    }

    /// Every command run so far, in order.
    pub fn executed(&self) -> Vec<ResolvedCommand> {
        self.executed.borrow().clone()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &ResolvedCommand) -> Result<CommandOutput> {
        self.executed.borrow_mut().push(command.clone());
        Ok(self.outputs.borrow_mut().pop_front().unwrap_or_default())
    }
}

/// Sleeper that only remembers what it was asked to wait.
pub struct RecordingSleeper {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self {
            pauses: RefCell::new(Vec::new()),
        }
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }
}

impl Default for RecordingSleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::core::models::operation::Operation;

    fn cmd(arg: &str) -> ResolvedCommand {
        ResolvedCommand {
            operation: Operation::Check,
            program: PathBuf::from("gpg"),
            args: vec![arg.to_string()],
        }
    }

    #[test]
    fn replays_outputs_in_order() {
        let runner = ScriptedRunner::with_outputs(vec![
            CommandOutput::new(2, "", "first"),
            CommandOutput::new(0, "second", ""),
        ]);
        assert_eq!(runner.run(&cmd("a")).unwrap().exit_code, 2);
        assert_eq!(runner.run(&cmd("b")).unwrap().stdout, "second");
        assert_eq!(runner.executed().len(), 2);
    }

    #[test]
    fn defaults_to_success_when_script_is_empty() {
        let runner = ScriptedRunner::new();
        let out = runner.run(&cmd("anything")).unwrap();
        assert_eq!(out, CommandOutput::default());
    }
}
