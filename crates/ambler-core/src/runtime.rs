//! Runtime executes a `TaskEnvelope` by dispatching to a registered handler.

use std::sync::Arc;

use crate::domain::TaskEnvelope;
use crate::error::AmblerError;
use crate::typed::{TaskContext, TypedRegistry};

pub struct Runtime {
    registry: Arc<TypedRegistry>,
}

impl Runtime {
    pub fn new(registry: Arc<TypedRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypedRegistry {
        &self.registry
    }

    /// Execute one envelope.
    pub async fn execute(
        &self,
        ctx: &TaskContext,
        envelope: &TaskEnvelope,
    ) -> Result<(), AmblerError> {
        let task_type = envelope.task_type();
        let handler = self
            .registry
            .get(task_type.as_str())
            .ok_or_else(|| AmblerError::HandlerNotFound(task_type.clone()))?;

        handler.handle_dyn(ctx, envelope).await
    }
}
