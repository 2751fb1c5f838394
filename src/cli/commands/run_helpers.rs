use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::adapters::locator::path_locator::locate_binary;
use crate::adapters::trace_log::json_trace_log::JsonTraceLog;
use crate::cli::output;
use crate::config::app_config::{ConfigLayer, ReconcileConfig};
use crate::core::errors::{ReconcileError, Result};
use crate::core::models::outcome::ReconcileResult;
use crate::core::models::run_record::RunRecord;
use crate::core::models::trace::AttemptTrace;
use crate::core::traits::trace_log::TraceLog;

/// Build the validated run configuration from the optional config file
/// and the command-line layer, then locate the gpg binary.
pub fn prepare(
    config_path: Option<&Path>,
    cli_layer: ConfigLayer,
) -> Result<(ReconcileConfig, PathBuf)> {
    let file_layer = match config_path {
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::default(),
    };
    let config = ReconcileConfig::from_layer(file_layer.merge(cli_layer))?;
    let binary = locate_binary(&config.gpg)?;
    Ok((config, binary))
}

/// Append the run to the trace log, if one is configured. Warns on failure
/// instead of propagating, since the log should not mask the run's outcome.
pub fn record_run(config: &ReconcileConfig, outcome: &Result<ReconcileResult>) {
    let Some(path) = &config.trace_file else {
        return;
    };

    let empty = AttemptTrace::default();
    let (action, changed, error, trace) = match outcome {
        Ok(result) => (Some(result.action), result.changed, None, &result.trace),
        Err(e) => (e.action(), false, Some(first_line(e)), e.trace().unwrap_or(&empty)),
    };

    let record = RunRecord {
        timestamp: Utc::now(),
        key: config.key_label(),
        state: config.state,
        check_mode: config.check_mode,
        action,
        changed,
        error,
        trace: trace.clone(),
    };

    let log = JsonTraceLog::new(path);
    if let Err(e) = log.append(&record) {
        output::warning(&format!(
            "Could not write trace log {}: {e}",
            log.path().display()
        ));
    }
}

fn first_line(e: &ReconcileError) -> String {
    e.to_string().lines().next().unwrap_or_default().to_string()
}

/// Print every attempt with its exit code, command line and stderr.
pub fn print_attempts(trace: &AttemptTrace) {
    for (name, attempts) in trace.operations() {
        for (n, attempt) in attempts.iter().enumerate() {
            output::detail(&format!(
                "{name} #{}: rc={} {}",
                n + 1,
                attempt.rc,
                attempt.command
            ));
            for line in attempt.stderr.lines() {
                output::detail(&format!("  {line}"));
            }
        }
    }
}

/// Print one line per operation with its attempt count.
pub fn print_trace(trace: &AttemptTrace) {
    for (name, count) in trace.summary() {
        output::detail(&format!("{name}: {count} attempt(s)"));
    }
}
