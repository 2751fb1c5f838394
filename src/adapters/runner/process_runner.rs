use std::process::Command;

use tracing::debug;

use crate::core::errors::{ReconcileError, Result};
use crate::core::models::trace::CommandOutput;
use crate::core::services::command_templates::ResolvedCommand;
use crate::core::traits::command_runner::CommandRunner;

/// Exit code reported for a process terminated by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Runs commands as child processes and captures their output.
///
/// The child gets `LC_ALL=C` so gpg's diagnostics stay in the untranslated
/// form the engine parses.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &ResolvedCommand) -> Result<CommandOutput> {
        debug!(operation = %command.operation, %command, "running");
        let output = Command::new(&command.program)
            .args(&command.args)
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| ReconcileError::CommandSpawn {
                program: command.program.clone(),
                reason: e.to_string(),
            })?;

        Ok(CommandOutput::new(
            output.status.code().unwrap_or(SIGNALLED_EXIT_CODE),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ))
    }
}
