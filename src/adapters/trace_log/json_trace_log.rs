use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::errors::{ReconcileError, Result};
use crate::core::models::run_record::RunRecord;
use crate::core::traits::trace_log::TraceLog;

/// Trace log that appends runs as JSON lines to a file.
///
/// Each line is one self-contained `RunRecord`, so a run can be replayed
/// or inspected without reading the rest of the file.
pub struct JsonTraceLog {
    path: PathBuf,
}

impl JsonTraceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceLog for JsonTraceLog {
    fn append(&self, record: &RunRecord) -> Result<()> {
        let line = serde_json::to_string(record).map_err(|e| ReconcileError::TraceLog {
            detail: format!("Failed to serialize run record: {e}"),
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ReconcileError::TraceLog {
                detail: format!("Cannot open trace log at {}: {e}", self.path.display()),
            })?;

        writeln!(file, "{line}").map_err(|e| ReconcileError::TraceLog {
            detail: format!("Failed to write run record: {e}"),
        })?;

        Ok(())
    }

    fn query(&self, key: Option<&str>, since: Option<DateTime<Utc>>) -> Result<Vec<RunRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).map_err(|e| ReconcileError::TraceLog {
            detail: format!("Cannot read trace log: {e}"),
        })?;

        let mut records = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| ReconcileError::TraceLog {
                detail: format!("Error reading trace log line {}: {e}", line_num + 1),
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: RunRecord =
                serde_json::from_str(trimmed).map_err(|e| ReconcileError::TraceLog {
                    detail: format!("Malformed run record at line {}: {e}", line_num + 1),
                })?;

            if let Some(key_filter) = key
                && !record
                    .key
                    .to_lowercase()
                    .contains(&key_filter.to_lowercase())
            {
                continue;
            }

            if let Some(since_date) = since
                && record.timestamp < since_date
            {
                continue;
            }

            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    use crate::core::models::desired_state::DesiredState;
    use crate::core::models::operation::Operation;
    use crate::core::models::outcome::Action;
    use crate::core::models::trace::{AttemptTrace, CommandOutput};

    fn sample(key: &str, changed: bool) -> RunRecord {
        let mut trace = AttemptTrace::default();
        trace.record(
            Operation::Check,
            format!("gpg --list-keys {key}"),
            CommandOutput::new(0, "pub", ""),
        );
        RunRecord {
            timestamp: Utc::now(),
            key: key.to_string(),
            state: DesiredState::Present,
            check_mode: false,
            action: Some(Action::NoOp),
            changed,
            error: None,
            trace,
        }
    }

    #[test]
    fn append_and_query_round_trip() {
        let tmp = TempDir::new().unwrap();
        let log = JsonTraceLog::new(tmp.path().join("runs.jsonl"));

        let record = sample("0xAAAA", false);
        log.append(&record).unwrap();

        let results = log.query(None, None).unwrap();
        assert_eq!(results, vec![record]);
    }

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let log = JsonTraceLog::new(tmp.path().join("nested/dir/runs.jsonl"));
        log.append(&sample("0xAAAA", true)).unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn filter_by_key_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        let log = JsonTraceLog::new(tmp.path().join("runs.jsonl"));
        log.append(&sample("0xAAAA", false)).unwrap();
        log.append(&sample("0xBBBB", true)).unwrap();

        let results = log.query(Some("bbbb"), None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "0xBBBB");
    }

    #[test]
    fn filter_by_since() {
        let tmp = TempDir::new().unwrap();
        let log = JsonTraceLog::new(tmp.path().join("runs.jsonl"));

        let mut old = sample("0xAAAA", false);
        old.timestamp = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        log.append(&old).unwrap();
        log.append(&sample("0xBBBB", false)).unwrap();

        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let results = log.query(None, Some(since)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "0xBBBB");
    }

    #[test]
    fn missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let log = JsonTraceLog::new(tmp.path().join("none.jsonl"));
        assert!(log.query(None, None).unwrap().is_empty());
    }

    #[test]
    fn malformed_line_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("runs.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let err = JsonTraceLog::new(&path).query(None, None).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
