//! Status views over the queue.

use serde::{Deserialize, Serialize};

use crate::domain::TaskId;
use crate::queue::TaskState;

/// Task counts by state. Terminal counts are bounded by the retention
/// policy, not a full history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueCounts {
    pub delayed: usize,
    pub queued: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Point-in-time view of a single task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: TaskId,
    pub state: TaskState,
    pub attempts: u32,
    pub last_error: Option<String>,
}
