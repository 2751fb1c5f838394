use std::path::Path;

use serde::Serialize;

use super::run_helpers;
use crate::adapters::runner::process_runner::ProcessRunner;
use crate::cli::RunArgs;
use crate::cli::output;
use crate::config::app_config::ReconcileConfig;
use crate::core::errors::{ReconcileError, Result};
use crate::core::models::outcome::{Action, ReconcileResult};
use crate::core::models::trace::AttemptTrace;
use crate::core::services::reconciler::Reconciler;
use crate::core::traits::sleeper::ThreadSleeper;

/// Payload printed with `--json` when a run ends in a terminal failure.
#[derive(Serialize)]
struct FailureReport<'a> {
    changed: bool,
    failed: bool,
    operation: &'a str,
    trace: &'a AttemptTrace,
}

/// Execute the `gpg-reconcile apply` command.
///
/// Converges the key to the desired state, records the run in the trace
/// log when one is configured, and reports the result.
pub fn execute(config_path: Option<&Path>, run: &RunArgs, trace_file: Option<&Path>) -> Result<()> {
    let mut cli_layer = run.to_layer();
    cli_layer.trace_file = trace_file.map(Path::to_path_buf);
    let (config, binary) = run_helpers::prepare(config_path, cli_layer)?;

    let runner = ProcessRunner;
    let sleeper = ThreadSleeper;
    let outcome = Reconciler::new(&config, binary, &runner, &sleeper).run();
    run_helpers::record_run(&config, &outcome);

    match outcome {
        Ok(result) => {
            if run.json {
                output::json(&result);
            } else {
                print_result(&config, &result);
            }
            Ok(())
        }
        Err(e) => {
            if let ReconcileError::TerminalFailure {
                operation, trace, ..
            } = &e
            {
                if run.json {
                    output::json(&FailureReport {
                        changed: false,
                        failed: true,
                        operation,
                        trace,
                    });
                } else {
                    output::header(&format!("gpg-reconcile apply: {operation} failed"));
                    run_helpers::print_attempts(trace);
                }
            }
            Err(e)
        }
    }
}

fn print_result(config: &ReconcileConfig, result: &ReconcileResult) {
    let key = config.key_label();
    output::header("gpg-reconcile apply");

    match (result.action, result.changed) {
        (Action::NoOp, _) => output::success(&format!("{key} is already {}", config.state)),
        (Action::Refresh, false) => output::success(&format!("{key} refreshed, no changes")),
        (action, _) => output::success(&format!("{key}: {action} (changed)")),
    }

    if config.check_mode {
        output::warning("Check mode: gpg ran with --dry-run, nothing was persisted");
    }

    run_helpers::print_trace(&result.trace);
}
