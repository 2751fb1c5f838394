use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::errors::Result;
use crate::core::models::operation::Operation;
use crate::core::models::trace::AttemptTrace;
use crate::core::services::command_templates::{Bindings, CommandSet};
use crate::core::traits::command_runner::CommandRunner;

/// Line gpg prints for every key it finds while importing.
static KEY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gpg: key ([0-9A-Fa-f]{8,40}):").expect("valid regex"));

/// First key identity reported in a gpg import diagnostic stream.
pub fn parse_key_identity(diagnostics: &str) -> Option<String> {
    KEY_LINE
        .captures(diagnostics)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Learn the identity of the key stored in the configured key file.
///
/// Runs a dry-run import and reads the identity from its diagnostics.
/// `Ok(None)` means the file holds no recognisable key, which callers treat
/// as "key absent" rather than as an error.
pub fn extract_identity<R: CommandRunner>(
    runner: &R,
    commands: &CommandSet,
    trace: &mut AttemptTrace,
) -> Result<Option<String>> {
    let command = commands
        .template(Operation::Inspect)?
        .resolve(&Bindings::none())?;
    let output = runner.run(&command)?;
    let record = trace.record(Operation::Inspect, command.to_string(), output);

    let identity = parse_key_identity(&record.stderr);
    debug!(rc = record.rc, identity = ?identity, "inspected key file");
    Ok(identity)
}
