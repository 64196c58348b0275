//! Task record: metadata + envelope.

use chrono::{DateTime, Utc};

use super::TaskState;
use crate::domain::TaskEnvelope;

/// Metadata + envelope for a task in the queue.
///
/// Design:
/// - This is the "single source of truth" for task state.
/// - Queue structures (ready/delayed) hold TaskId only.
/// - All state transitions happen here.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub envelope: TaskEnvelope,
    pub state: TaskState,

    /// Number of times this task has been delivered (including the current
    /// delivery while Running). At-most-once, so this never exceeds 1.
    pub attempts: u32,

    /// Last error message (if any).
    pub last_error: Option<String>,

    /// Timestamps for observability.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// New record, immediately eligible.
    pub fn new(envelope: TaskEnvelope) -> Self {
        let now = Utc::now();
        Self {
            envelope,
            state: TaskState::Queued,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// New record parked until its eligibility instant.
    pub fn new_delayed(envelope: TaskEnvelope) -> Self {
        let mut record = Self::new(envelope);
        record.state = TaskState::Delayed;
        record
    }

    /// Mark as running (increment attempts).
    pub fn start_attempt(&mut self) {
        self.state = TaskState::Running;
        self.attempts += 1;
        self.updated_at = Utc::now();
    }

    /// Mark as succeeded.
    pub fn mark_succeeded(&mut self) {
        self.state = TaskState::Succeeded;
        self.updated_at = Utc::now();
    }

    /// Mark as failed (terminal; no retry path exists).
    pub fn mark_failed(&mut self, error: String) {
        self.state = TaskState::Failed;
        self.last_error = Some(error);
        self.updated_at = Utc::now();
    }

    /// Move from Delayed to Queued.
    pub fn make_eligible(&mut self) {
        self.state = TaskState::Queued;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskType};

    fn envelope() -> TaskEnvelope {
        TaskEnvelope::new(
            TaskId::generate(),
            TaskType::new("test.task.noop.v1"),
            serde_json::json!({}),
        )
    }

    #[test]
    fn delivery_increments_attempts_once() {
        let mut record = TaskRecord::new(envelope());
        assert_eq!(record.attempts, 0);

        record.start_attempt();
        assert_eq!(record.state, TaskState::Running);
        assert_eq!(record.attempts, 1);

        record.mark_failed("boom".to_string());
        assert_eq!(record.state, TaskState::Failed);
        assert_eq!(record.last_error.as_deref(), Some("boom"));
        assert_eq!(record.attempts, 1);
    }

    #[test]
    fn delayed_record_becomes_eligible() {
        let mut record = TaskRecord::new_delayed(envelope());
        assert_eq!(record.state, TaskState::Delayed);

        record.make_eligible();
        assert_eq!(record.state, TaskState::Queued);
    }
}
