use thiserror::Error;

use crate::backfill::feed::FeedError;
use crate::domain::TaskType;

#[derive(Debug, Error)]
pub enum AmblerError {
    #[error("handler not found for task_type={0}")]
    HandlerNotFound(TaskType),

    #[error("duplicate handler for task_type={0}")]
    DuplicateHandler(TaskType),

    #[error("payload codec failed for task_type={task_type}: {source}")]
    Codec {
        task_type: TaskType,
        #[source]
        source: serde_json::Error,
    },

    #[error("task_type mismatch: expected {expected}, got {got}")]
    TaskTypeMismatch { expected: TaskType, got: TaskType },

    #[error("feed fetch failed: {0}")]
    Feed(#[from] FeedError),

    #[error("{0}")]
    Other(String),
}
