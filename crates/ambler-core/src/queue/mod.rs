//! Queue module: state management, retention, and in-memory implementation.

mod memory;
mod record;
mod retention;
mod state;

pub use memory::InMemoryQueue;
pub use record::TaskRecord;
pub use retention::RetentionPolicy;
pub use state::TaskState;

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{TaskEnvelope, TaskId};
use crate::error::AmblerError;

/// A leased task for processing.
/// The worker owns this lease and must either `ack` or `fail`.
///
/// Design intent:
/// - Queue manages state transitions (Queued -> Running -> ...).
/// - Worker/Runtime executes side effects and reports the result.
/// - `TaskEnvelope` is exposed as an immutable reference to avoid accidental
///   mutation.
#[async_trait]
pub trait TaskLease: Send {
    fn envelope(&self) -> &TaskEnvelope;

    /// Which delivery of the task this lease represents (1-based).
    /// Surfaced so handlers can quote it in failure reports.
    fn attempt(&self) -> u32;

    /// Mark success.
    async fn ack(self: Box<Self>) -> Result<(), AmblerError>;

    /// Mark failure. Delivery is at-most-once: the task goes terminal,
    /// it is never redelivered.
    async fn fail(self: Box<Self>, error: String) -> Result<(), AmblerError>;
}

/// Queue port (interface).
/// The in-memory implementation stands in for a durable broker; this trait
/// is the seam for swapping implementations later.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Enqueue a task, eligible for lease after `delay` has elapsed.
    /// `Duration::ZERO` means immediately eligible.
    async fn enqueue(&self, envelope: TaskEnvelope, delay: Duration) -> Result<TaskId, AmblerError>;

    /// Lease one ready task (waits until one becomes eligible).
    async fn lease(&self) -> Option<Box<dyn TaskLease>>;

    /// Observability hook.
    async fn counts_by_state(&self) -> Result<crate::observability::QueueCounts, AmblerError>;
}
