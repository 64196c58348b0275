//! Attempt model for execution history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AttemptId, TaskId};
use super::outcome::AttemptOutcome;

/// A single delivery of a task to a worker.
///
/// Records:
/// - What was executed (the task payload, as `action`)
/// - Which delivery it was (`attempt`, 1-based)
/// - What happened (`outcome`)
///
/// With at-most-once delivery there is never more than one record per task,
/// but the attempt number is recorded anyway so failure reports can quote it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_id: AttemptId,
    pub task_id: TaskId,

    /// Which delivery of the task this was (1-based).
    pub attempt: u32,

    /// The task payload as executed (flexible JSON).
    pub action: serde_json::Value,

    /// The result of this delivery.
    pub outcome: AttemptOutcome,

    pub completed_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(
        task_id: TaskId,
        attempt: u32,
        action: serde_json::Value,
        outcome: AttemptOutcome,
    ) -> Self {
        Self {
            attempt_id: AttemptId::generate(),
            task_id,
            attempt,
            action,
            outcome,
            completed_at: Utc::now(),
        }
    }
}
