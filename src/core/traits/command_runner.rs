use crate::core::errors::Result;
use crate::core::models::trace::CommandOutput;
use crate::core::services::command_templates::ResolvedCommand;

/// Port for running a fully resolved command.
///
/// A non-zero exit code is a normal outcome and must come back as
/// `Ok`. `Err` is reserved for commands that could not be started at all.
pub trait CommandRunner {
    fn run(&self, command: &ResolvedCommand) -> Result<CommandOutput>;
}
