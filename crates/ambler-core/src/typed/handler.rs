//! Handler trait - Task を実行する Handler の定義
//!
//! - ジェネリック trait (Handler<T>)
//! - Object-safe trait (DynHandler)
//! - Type erasure パターン (TypedHandler<T, H> → DynHandler)

use std::marker::PhantomData;

use async_trait::async_trait;

use super::codec::decode_task;
use super::task::Task;
use crate::domain::{TaskEnvelope, TaskId};
use crate::error::AmblerError;

/// Delivery context passed to handlers alongside the decoded task.
///
/// `attempt` is the delivery number surfaced by the queue; handlers quote it
/// in failure reports.
#[derive(Debug, Clone, Copy)]
pub struct TaskContext {
    pub task_id: TaskId,
    pub attempt: u32,
}

/// Handler は Task を実行する
///
/// # ジェネリクスによる型安全性
/// - `Handler<BackfillTask>` は `BackfillTask` しか受け取れない
/// - コンパイル時に Task と Handler の対応が保証される
#[async_trait]
pub trait Handler<T: Task>: Send + Sync {
    async fn handle(&self, ctx: &TaskContext, task: T) -> Result<(), AmblerError>;
}

/// DynHandler は object-safe な Handler の抽象化
///
/// TypedHandler<T> を DynHandler に変換することで、
/// HashMap<String, Arc<dyn DynHandler>> に格納可能にします。
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        ctx: &TaskContext,
        envelope: &TaskEnvelope,
    ) -> Result<(), AmblerError>;

    fn task_type(&self) -> &str;
}

pub struct TypedHandler<T: Task, H: Handler<T>> {
    handler: H,
    _marker: PhantomData<T>,
}

impl<T: Task, H: Handler<T>> TypedHandler<T, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Task, H: Handler<T>> DynHandler for TypedHandler<T, H> {
    async fn handle_dyn(
        &self,
        ctx: &TaskContext,
        envelope: &TaskEnvelope,
    ) -> Result<(), AmblerError> {
        let task: T = decode_task(envelope)?;
        self.handler.handle(ctx, task).await
    }

    fn task_type(&self) -> &str {
        T::TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskType;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct CountTask {
        value: i32,
    }

    impl Task for CountTask {
        const TYPE: &'static str = "test.task.count.v1";
    }

    #[derive(Default)]
    struct CountHandler {
        seen: AtomicI32,
    }

    #[async_trait]
    impl Handler<CountTask> for CountHandler {
        async fn handle(&self, _ctx: &TaskContext, task: CountTask) -> Result<(), AmblerError> {
            self.seen.store(task.value, Ordering::Relaxed);
            Ok(())
        }
    }

    fn ctx() -> TaskContext {
        TaskContext {
            task_id: TaskId::generate(),
            attempt: 1,
        }
    }

    #[tokio::test]
    async fn typed_handler_decodes_and_dispatches() {
        let typed = TypedHandler::<CountTask, _>::new(CountHandler::default());
        assert_eq!(typed.task_type(), "test.task.count.v1");

        let envelope = TaskEnvelope::new(
            TaskId::generate(),
            TaskType::new(CountTask::TYPE),
            serde_json::json!({"value": 100}),
        );
        typed.handle_dyn(&ctx(), &envelope).await.unwrap();
        assert_eq!(typed.handler.seen.load(Ordering::Relaxed), 100);
    }

    #[tokio::test]
    async fn typed_handler_rejects_foreign_envelope() {
        let typed = TypedHandler::<CountTask, _>::new(CountHandler::default());

        let envelope = TaskEnvelope::new(
            TaskId::generate(),
            TaskType::new("test.task.other.v1"),
            serde_json::json!({"value": 1}),
        );
        let err = typed.handle_dyn(&ctx(), &envelope).await.unwrap_err();
        assert!(matches!(err, AmblerError::TaskTypeMismatch { .. }));
    }
}
