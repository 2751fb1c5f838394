use serde::{Deserialize, Serialize};

use super::desired_state::DesiredState;
use super::outcome::Action;
use super::trace::AttemptTrace;

/// One reconciliation run as stored in the trace log (JSON lines format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Declared key id, or the key file path when no id was given.
    pub key: String,
    pub state: DesiredState,
    pub check_mode: bool,
    /// `None` when the run failed before an action was chosen.
    pub action: Option<Action>,
    pub changed: bool,
    pub error: Option<String>,
    pub trace: AttemptTrace,
}
