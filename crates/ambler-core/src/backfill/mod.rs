//! Backfill walker: paginates backward through a time-ordered feed until a
//! time boundary is crossed, re-enqueueing itself one step at a time.

pub mod feed;
pub mod task;
pub mod walker;

pub use feed::{FeedClient, FeedError, FeedPage, SortOrder};
pub use task::{BackfillTask, Cursor};
pub use walker::{BackfillWalker, Outcome, WalkerConfig};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::TaskId;
use crate::error::AmblerError;
use crate::queue::Queue;
use crate::typed::codec::encode_task;

/// Entry point for putting backfill tasks on the queue.
///
/// Both external seeding and the walker's own continuations go through here;
/// there is no other way a backfill task is created. Submitting the same
/// (cursor, start_time) twice yields two independent tasks - no
/// deduplication happens at this layer.
#[derive(Clone)]
pub struct Submitter {
    queue: Arc<dyn Queue>,
}

impl Submitter {
    pub fn new(queue: Arc<dyn Queue>) -> Self {
        Self { queue }
    }

    /// Enqueue a backfill step, eligible after `delay` has elapsed.
    pub async fn submit(
        &self,
        cursor: Cursor,
        start_time: DateTime<Utc>,
        delay: Duration,
    ) -> Result<TaskId, AmblerError> {
        self.submit_task(BackfillTask { cursor, start_time }, delay)
            .await
    }

    pub(crate) async fn submit_task(
        &self,
        task: BackfillTask,
        delay: Duration,
    ) -> Result<TaskId, AmblerError> {
        let envelope = encode_task(&task)?;
        self.queue.enqueue(envelope, delay).await
    }
}
