//! Task state machine for the queue.

use serde::{Deserialize, Serialize};

/// Task state.
///
/// State transitions:
/// - Delayed -> Queued (eligibility instant reached)
/// - Queued -> Running -> Succeeded
/// - Queued -> Running -> Failed (first failure is terminal; delivery is
///   at-most-once and there is no retry state)
///
/// Design note: Using an enum ensures exhaustive matching and prevents
/// invalid states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Enqueued with a delay; not yet eligible for lease.
    Delayed,

    /// Ready to run immediately.
    Queued,

    /// Currently being executed by a worker.
    Running,

    /// Successfully completed.
    Succeeded,

    /// Failed on its single delivery.
    Failed,
}

impl TaskState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }

    /// Is this task runnable (eligible for lease)?
    pub fn is_runnable(self) -> bool {
        matches!(self, TaskState::Queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Delayed.is_terminal());
        assert!(!TaskState::Queued.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }

    #[test]
    fn only_queued_is_runnable() {
        assert!(TaskState::Queued.is_runnable());
        assert!(!TaskState::Delayed.is_runnable());
        assert!(!TaskState::Running.is_runnable());
    }
}
