//! Payload codec - envelope と typed Task の相互変換

use super::task::Task;
use crate::domain::{TaskEnvelope, TaskId, TaskType};
use crate::error::AmblerError;

/// Encode a typed task into a fresh envelope for enqueueing.
pub fn encode_task<T: Task>(task: &T) -> Result<TaskEnvelope, AmblerError> {
    let payload = serde_json::to_value(task).map_err(|e| AmblerError::Codec {
        task_type: TaskType::new(T::TYPE),
        source: e,
    })?;
    Ok(TaskEnvelope::new(
        TaskId::generate(),
        TaskType::new(T::TYPE),
        payload,
    ))
}

/// Decode an envelope's payload back into the typed task.
///
/// The envelope's task_type must match `T::TYPE`; dispatching a payload to
/// the wrong type is a wiring bug, not a data error.
pub fn decode_task<T: Task>(envelope: &TaskEnvelope) -> Result<T, AmblerError> {
    if envelope.task_type().as_str() != T::TYPE {
        return Err(AmblerError::TaskTypeMismatch {
            expected: TaskType::new(T::TYPE),
            got: envelope.task_type().clone(),
        });
    }
    serde_json::from_value(envelope.payload().clone()).map_err(|e| AmblerError::Codec {
        task_type: envelope.task_type().clone(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct PingTask {
        value: i32,
    }

    impl Task for PingTask {
        const TYPE: &'static str = "test.task.ping.v1";
    }

    #[test]
    fn encode_then_decode_preserves_task() {
        let task = PingTask { value: 100 };
        let envelope = encode_task(&task).unwrap();
        assert_eq!(envelope.task_type().as_str(), "test.task.ping.v1");

        let back: PingTask = decode_task(&envelope).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn decode_rejects_mismatched_task_type() {
        let envelope = TaskEnvelope::new(
            TaskId::generate(),
            TaskType::new("test.task.other.v1"),
            serde_json::json!({"value": 1}),
        );

        let err = decode_task::<PingTask>(&envelope).unwrap_err();
        assert!(matches!(err, AmblerError::TaskTypeMismatch { .. }));
    }

    #[test]
    fn decode_rejects_malformed_payload() {
        let envelope = TaskEnvelope::new(
            TaskId::generate(),
            TaskType::new("test.task.ping.v1"),
            serde_json::json!({"value": "not a number"}),
        );

        let err = decode_task::<PingTask>(&envelope).unwrap_err();
        assert!(matches!(err, AmblerError::Codec { .. }));
    }
}
