use crate::core::errors::Result;
use crate::core::models::run_record::RunRecord;

/// Port for persisting and querying past runs.
pub trait TraceLog {
    /// Append a run to the log.
    fn append(&self, record: &RunRecord) -> Result<()>;

    /// Query all runs, optionally filtered by key and start date.
    fn query(
        &self,
        key: Option<&str>,
        since: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Vec<RunRecord>>;
}
