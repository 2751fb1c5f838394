use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;

use crate::adapters::trace_log::json_trace_log::JsonTraceLog;
use crate::cli::output;
use crate::core::errors::{ReconcileError, Result};
use crate::core::models::outcome::Action;
use crate::core::models::run_record::RunRecord;
use crate::core::traits::trace_log::TraceLog;

/// Execute the `gpg-reconcile history` command.
///
/// Lists recorded runs with optional filters for key, date, and count.
pub fn execute(
    trace_file: &Path,
    key: Option<&str>,
    since: Option<&str>,
    last: Option<usize>,
) -> Result<()> {
    let since_dt = since.map(parse_since).transpose()?;
    let records = JsonTraceLog::new(trace_file).query(key, since_dt)?;

    if records.is_empty() {
        output::header("gpg-reconcile history");
        output::warning("No runs recorded");
        if key.is_some() || since.is_some() {
            output::detail("Try removing filters to see all runs.");
        }
        return Ok(());
    }

    let skip = last.map_or(0, |n| records.len().saturating_sub(n));
    let display = &records[skip..];

    output::header(&format!("gpg-reconcile history ({} runs)", display.len()));
    println!();
    for record in display {
        print_record(record);
    }

    Ok(())
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`) into a UTC DateTime.
fn parse_since(s: &str) -> Result<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        ReconcileError::InvalidConfig {
            detail: format!(
                "Invalid date format: '{s}'. Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"
            ),
        }
    })?;
    Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
}

/// Print a single run as a formatted row.
fn print_record(record: &RunRecord) {
    let date = record.timestamp.format("%Y-%m-%d %H:%M:%S");
    let outcome = match (&record.error, record.changed) {
        (Some(_), _) => "failed".red().to_string(),
        (None, true) => "changed".yellow().to_string(),
        (None, false) => "ok".green().to_string(),
    };
    let action = record
        .action
        .map_or_else(|| "—".to_string(), format_action);
    let mode = if record.check_mode {
        "(check)".dimmed().to_string()
    } else {
        String::new()
    };

    println!(
        "  {} {} {:<18} {:<8} {:<16} {} {} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        record.key,
        record.state,
        action,
        outcome,
        format!("{} attempt(s)", record.trace.total()).dimmed(),
        mode,
    );
    if let Some(err) = &record.error {
        println!("    {}", err.dimmed());
    }
}

fn format_action(action: Action) -> String {
    match action {
        Action::NoOp => "no-op".dimmed().to_string(),
        Action::Delete => "delete".red().to_string(),
        Action::Refresh => "refresh".blue().to_string(),
        Action::Receive => "receive".green().to_string(),
        Action::ImportFromFile => "import-from-file".green().to_string(),
    }
}
