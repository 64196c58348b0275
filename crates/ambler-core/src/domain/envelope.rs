use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::task_type::TaskType;

/// TaskType + Payload (+ TaskId) の“運搬用”データ。
///
/// The queue stores and delivers envelopes; it never looks inside the
/// payload. Decoding back into a typed task happens at dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    task_id: TaskId,
    task_type: TaskType,
    payload: serde_json::Value,
}

impl TaskEnvelope {
    pub fn new(task_id: TaskId, task_type: TaskType, payload: serde_json::Value) -> Self {
        Self {
            task_id,
            task_type,
            payload,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}
