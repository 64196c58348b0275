//! In-memory queue implementation.
//!
//! Stands in for the durable broker during development and tests:
//! delayed eligibility, at-most-once delivery, bounded retention of
//! terminal records.

use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use super::{Queue, RetentionPolicy, TaskLease, TaskRecord, TaskState};
use crate::domain::{AttemptOutcome, AttemptRecord, TaskEnvelope, TaskId};
use crate::error::AmblerError;
use crate::observability::{QueueCounts, TaskStatus};

/// Delayed task entry for the eligibility heap.
///
/// We use Reverse ordering so BinaryHeap acts as a min-heap (earliest first).
#[derive(Debug, Clone, PartialEq, Eq)]
struct DelayedTask {
    eligible_at: Instant,
    task_id: TaskId,
}

impl PartialOrd for DelayedTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse ordering: earlier times have higher priority
        other.eligible_at.cmp(&self.eligible_at)
    }
}

/// In-memory queue state.
struct InMemoryQueueState {
    /// All task records (single source of truth for tasks).
    records: HashMap<TaskId, TaskRecord>,

    /// Ready queue (TaskIds only, FIFO).
    ready: VecDeque<TaskId>,

    /// Delayed queue (eligibility instants).
    delayed: BinaryHeap<DelayedTask>,

    /// One attempt record per task (delivery is at-most-once).
    attempts: HashMap<TaskId, AttemptRecord>,

    /// Terminal records in completion order, for retention pruning.
    completed_order: VecDeque<TaskId>,
    failed_order: VecDeque<TaskId>,

    retention: RetentionPolicy,
}

impl InMemoryQueueState {
    fn new(retention: RetentionPolicy) -> Self {
        Self {
            records: HashMap::new(),
            ready: VecDeque::new(),
            delayed: BinaryHeap::new(),
            attempts: HashMap::new(),
            completed_order: VecDeque::new(),
            failed_order: VecDeque::new(),
            retention,
        }
    }

    /// Move tasks from delayed to ready if their time has come.
    fn promote_delayed_tasks(&mut self) {
        let now = Instant::now();
        while let Some(entry) = self.delayed.peek() {
            if entry.eligible_at > now {
                break; // Heap is sorted, so we can stop
            }

            let entry = self.delayed.pop().expect("peeked entry exists");
            if let Some(record) = self.records.get_mut(&entry.task_id)
                && record.state == TaskState::Delayed
            {
                record.make_eligible();
                self.ready.push_back(entry.task_id);
            }
        }
    }

    /// Drop the oldest terminal records (and their attempts) over the caps.
    fn prune_terminal_records(&mut self) {
        while self.completed_order.len() > self.retention.max_completed {
            if let Some(task_id) = self.completed_order.pop_front() {
                self.records.remove(&task_id);
                self.attempts.remove(&task_id);
            }
        }
        while self.failed_order.len() > self.retention.max_failed {
            if let Some(task_id) = self.failed_order.pop_front() {
                self.records.remove(&task_id);
                self.attempts.remove(&task_id);
            }
        }
    }

    /// Get counts by state for observability.
    fn counts_by_state(&self) -> QueueCounts {
        let mut counts = QueueCounts::default();
        for record in self.records.values() {
            match record.state {
                TaskState::Delayed => counts.delayed += 1,
                TaskState::Queued => counts.queued += 1,
                TaskState::Running => counts.running += 1,
                TaskState::Succeeded => counts.succeeded += 1,
                TaskState::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

/// In-memory queue implementation.
pub struct InMemoryQueue {
    state: Arc<Mutex<InMemoryQueueState>>,
    notify: Arc<Notify>,
}

impl InMemoryQueue {
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryQueueState::new(retention))),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Status view of one task, if its record is still retained.
    pub async fn status(&self, task_id: TaskId) -> Option<TaskStatus> {
        let state = self.state.lock().await;
        state.records.get(&task_id).map(|record| TaskStatus {
            task_id,
            state: record.state,
            attempts: record.attempts,
            last_error: record.last_error.clone(),
        })
    }

    /// Retained attempt records, oldest first.
    pub async fn recent_attempts(&self) -> Vec<AttemptRecord> {
        let state = self.state.lock().await;
        let mut attempts: Vec<_> = state.attempts.values().cloned().collect();
        attempts.sort_by_key(|a| a.completed_at);
        attempts
    }
}

#[async_trait]
impl Queue for InMemoryQueue {
    async fn enqueue(
        &self,
        envelope: TaskEnvelope,
        delay: Duration,
    ) -> Result<TaskId, AmblerError> {
        let task_id = envelope.task_id();

        {
            let mut state = self.state.lock().await;
            if delay.is_zero() {
                state.records.insert(task_id, TaskRecord::new(envelope));
                state.ready.push_back(task_id);
            } else {
                state
                    .records
                    .insert(task_id, TaskRecord::new_delayed(envelope));
                state.delayed.push(DelayedTask {
                    eligible_at: Instant::now() + delay,
                    task_id,
                });
            }
        }

        // Notify waiting workers (outside the lock)
        self.notify.notify_one();

        Ok(task_id)
    }

    async fn lease(&self) -> Option<Box<dyn TaskLease>> {
        loop {
            let next_wake = {
                let mut state = self.state.lock().await;
                state.promote_delayed_tasks();

                if let Some(task_id) = state.ready.pop_front()
                    && let Some(record) = state.records.get_mut(&task_id)
                {
                    record.start_attempt();
                    let lease = InMemoryLease {
                        task_id,
                        attempt: record.attempts,
                        envelope: record.envelope.clone(),
                        queue: Arc::clone(&self.state),
                    };
                    return Some(Box::new(lease));
                }

                // No ready tasks - check if we have delayed tasks
                state.delayed.peek().map(|entry| entry.eligible_at)
            };

            // Wait for notification OR the next delayed eligibility instant
            if let Some(wake_time) = next_wake {
                tokio::select! {
                    _ = self.notify.notified() => {},
                    _ = tokio::time::sleep_until(wake_time) => {},
                }
            } else {
                self.notify.notified().await;
            }
        }
    }

    async fn counts_by_state(&self) -> Result<QueueCounts, AmblerError> {
        let state = self.state.lock().await;
        Ok(state.counts_by_state())
    }
}

/// Lease implementation for InMemoryQueue.
struct InMemoryLease {
    task_id: TaskId,
    attempt: u32,
    envelope: TaskEnvelope,
    queue: Arc<Mutex<InMemoryQueueState>>,
}

#[async_trait]
impl TaskLease for InMemoryLease {
    fn envelope(&self) -> &TaskEnvelope {
        &self.envelope
    }

    fn attempt(&self) -> u32 {
        self.attempt
    }

    async fn ack(self: Box<Self>) -> Result<(), AmblerError> {
        let mut state = self.queue.lock().await;

        let attempt_record = AttemptRecord::new(
            self.task_id,
            self.attempt,
            self.envelope.payload().clone(),
            AttemptOutcome::success(),
        );
        state.attempts.insert(self.task_id, attempt_record);

        if let Some(record) = state.records.get_mut(&self.task_id) {
            record.mark_succeeded();
            state.completed_order.push_back(self.task_id);
        }
        state.prune_terminal_records();

        Ok(())
    }

    async fn fail(self: Box<Self>, error: String) -> Result<(), AmblerError> {
        let mut state = self.queue.lock().await;

        let attempt_record = AttemptRecord::new(
            self.task_id,
            self.attempt,
            self.envelope.payload().clone(),
            AttemptOutcome::failure(error.clone()),
        );
        state.attempts.insert(self.task_id, attempt_record);

        // At-most-once: terminal on the first failure, never redelivered.
        if let Some(record) = state.records.get_mut(&self.task_id) {
            record.mark_failed(error);
            state.failed_order.push_back(self.task_id);
        }
        state.prune_terminal_records();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutcomeKind, TaskType};

    fn envelope(payload: serde_json::Value) -> TaskEnvelope {
        TaskEnvelope::new(TaskId::generate(), TaskType::new("test.task.noop.v1"), payload)
    }

    #[tokio::test]
    async fn enqueue_and_counts() {
        let queue = InMemoryQueue::new(RetentionPolicy::default());

        queue
            .enqueue(envelope(serde_json::json!({})), Duration::ZERO)
            .await
            .unwrap();

        let counts = queue.counts_by_state().await.unwrap();
        assert_eq!(counts.queued, 1);
        assert_eq!(counts.running, 0);
    }

    #[tokio::test]
    async fn lease_transitions_to_running() {
        let queue = InMemoryQueue::new(RetentionPolicy::default());
        let task_id = queue
            .enqueue(envelope(serde_json::json!({})), Duration::ZERO)
            .await
            .unwrap();

        let lease = tokio::time::timeout(Duration::from_millis(100), queue.lease())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(lease.envelope().task_id(), task_id);
        assert_eq!(lease.attempt(), 1);

        let counts = queue.counts_by_state().await.unwrap();
        assert_eq!(counts.queued, 0);
        assert_eq!(counts.running, 1);
    }

    #[tokio::test]
    async fn ack_marks_succeeded_and_records_attempt() {
        let queue = InMemoryQueue::new(RetentionPolicy::default());
        let payload = serde_json::json!({"key": "value"});
        let task_id = queue.enqueue(envelope(payload.clone()), Duration::ZERO).await.unwrap();

        let lease = queue.lease().await.unwrap();
        lease.ack().await.unwrap();

        let counts = queue.counts_by_state().await.unwrap();
        assert_eq!(counts.succeeded, 1);
        assert_eq!(counts.running, 0);

        let attempts = queue.recent_attempts().await;
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].task_id, task_id);
        assert_eq!(attempts[0].attempt, 1);
        assert_eq!(attempts[0].outcome.kind, OutcomeKind::Success);
        assert_eq!(attempts[0].action, payload);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_is_terminal_and_never_redelivered() {
        let queue = InMemoryQueue::new(RetentionPolicy::default());
        queue
            .enqueue(envelope(serde_json::json!({})), Duration::ZERO)
            .await
            .unwrap();

        let lease = queue.lease().await.unwrap();
        lease.fail("boom".to_string()).await.unwrap();

        let counts = queue.counts_by_state().await.unwrap();
        assert_eq!(counts.failed, 1);

        let attempts = queue.recent_attempts().await;
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].attempt, 1);
        assert_eq!(attempts[0].outcome.kind, OutcomeKind::Failure);
        assert_eq!(attempts[0].outcome.reason.as_deref(), Some("boom"));

        // Nothing comes back out of the queue.
        let redelivery = tokio::time::timeout(Duration::from_secs(5), queue.lease()).await;
        assert!(redelivery.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_task_is_invisible_until_eligible() {
        let queue = InMemoryQueue::new(RetentionPolicy::default());
        queue
            .enqueue(envelope(serde_json::json!({})), Duration::from_secs(1))
            .await
            .unwrap();

        let counts = queue.counts_by_state().await.unwrap();
        assert_eq!(counts.delayed, 1);

        let early = tokio::time::timeout(Duration::from_millis(900), queue.lease()).await;
        assert!(early.is_err());

        let later = tokio::time::timeout(Duration::from_millis(200), queue.lease()).await;
        assert!(later.is_ok());
    }

    #[tokio::test]
    async fn ready_tasks_are_leased_in_fifo_order() {
        let queue = InMemoryQueue::new(RetentionPolicy::default());
        let first = queue
            .enqueue(envelope(serde_json::json!({"n": 1})), Duration::ZERO)
            .await
            .unwrap();
        let second = queue
            .enqueue(envelope(serde_json::json!({"n": 2})), Duration::ZERO)
            .await
            .unwrap();

        let lease = queue.lease().await.unwrap();
        assert_eq!(lease.envelope().task_id(), first);
        lease.ack().await.unwrap();

        let lease = queue.lease().await.unwrap();
        assert_eq!(lease.envelope().task_id(), second);
        lease.ack().await.unwrap();
    }

    #[tokio::test]
    async fn retention_prunes_oldest_terminal_records() {
        let queue = InMemoryQueue::new(RetentionPolicy {
            max_completed: 2,
            max_failed: 2,
        });

        let mut ids = Vec::new();
        for n in 0..3 {
            let id = queue
                .enqueue(envelope(serde_json::json!({"n": n})), Duration::ZERO)
                .await
                .unwrap();
            ids.push(id);
            let lease = queue.lease().await.unwrap();
            lease.ack().await.unwrap();
        }

        let counts = queue.counts_by_state().await.unwrap();
        assert_eq!(counts.succeeded, 2);

        // Oldest record is gone, newest two are retained.
        assert!(queue.status(ids[0]).await.is_none());
        assert!(queue.status(ids[2]).await.is_some());
        assert_eq!(queue.recent_attempts().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_wakes_waiting_lease() {
        let queue = Arc::new(InMemoryQueue::new(RetentionPolicy::default()));

        let lease_future = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.lease().await.unwrap() }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        queue
            .enqueue(envelope(serde_json::json!({})), Duration::ZERO)
            .await
            .unwrap();

        let lease = lease_future.await.unwrap();
        assert_eq!(lease.attempt(), 1);
    }
}
