use std::path::Path;

use super::run_helpers;
use crate::adapters::runner::process_runner::ProcessRunner;
use crate::cli::RunArgs;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::outcome::Action;
use crate::core::services::reconciler::Reconciler;
use crate::core::traits::sleeper::ThreadSleeper;

/// Execute the `gpg-reconcile status` command.
///
/// Probes the keyring and shows the action `apply` would take, without
/// running anything that modifies it.
pub fn execute(config_path: Option<&Path>, run: &RunArgs) -> Result<()> {
    let (config, binary) = run_helpers::prepare(config_path, run.to_layer())?;

    let runner = ProcessRunner;
    let sleeper = ThreadSleeper;
    let report = Reconciler::new(&config, binary, &runner, &sleeper).probe()?;

    if run.json {
        output::json(&report);
        return Ok(());
    }

    output::header("gpg-reconcile status");
    let key = report
        .identity
        .clone()
        .unwrap_or_else(|| config.key_label());

    if report.present {
        output::success(&format!("{key} is present"));
    } else {
        output::warning(&format!("{key} is not present"));
    }

    match report.planned {
        Action::NoOp => output::success(&format!("In desired state ({})", config.state)),
        action => output::warning(&format!("apply would run: {action}")),
    }

    run_helpers::print_trace(&report.trace);
    Ok(())
}
