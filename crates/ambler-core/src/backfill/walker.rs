//! The walker itself: one fetch, one decision, at most one successor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use super::Submitter;
use super::feed::{FeedClient, FeedError, SortOrder};
use super::task::BackfillTask;
use crate::error::AmblerError;
use crate::typed::{Handler, TaskContext};

/// Walker tuning knobs.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Records per fetched page. Small on purpose: the walk is throttled,
    /// not throughput-bound.
    pub page_size: u32,

    /// Delay before a continuation becomes eligible, throttling the walk
    /// rate independent of fetch latency.
    pub continuation_delay: Duration,

    /// Upper bound on a single fetch round trip.
    pub fetch_timeout: Duration,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            page_size: 2,
            continuation_delay: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(60),
        }
    }
}

/// Result of processing one backfill step.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Boundary not yet reached; the successor has been scheduled.
    Continued(BackfillTask),

    /// Chain terminated: boundary reached, or the step failed.
    Stopped,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Continued(_) => "continued",
            Outcome::Stopped => "stopped",
        }
    }
}

/// Walks a time-ordered feed backward until the boundary is crossed.
///
/// Each invocation fetches one page from the task's cursor and either
/// schedules exactly one continuation (carrying the unchanged boundary) or
/// lets the chain end. Every error is absorbed here: a broken backfill
/// halts instead of blocking or endlessly retrying, and nothing propagates
/// to the worker.
pub struct BackfillWalker {
    feed: Arc<dyn FeedClient>,
    submitter: Submitter,
    config: WalkerConfig,
}

impl BackfillWalker {
    pub fn new(feed: Arc<dyn FeedClient>, submitter: Submitter) -> Self {
        Self::with_config(feed, submitter, WalkerConfig::default())
    }

    pub fn with_config(
        feed: Arc<dyn FeedClient>,
        submitter: Submitter,
        config: WalkerConfig,
    ) -> Self {
        Self {
            feed,
            submitter,
            config,
        }
    }

    /// Process one step of the chain. Emits exactly one trace event per
    /// invocation: info on either decision, error on failure.
    pub async fn process(&self, ctx: &TaskContext, task: &BackfillTask) -> Outcome {
        match self.walk(task).await {
            Ok(outcome) => {
                info!(
                    cursor = %task.cursor,
                    outcome = outcome.label(),
                    "backfilled from cursor"
                );
                outcome
            }
            Err(err) => {
                error!(
                    cursor = %task.cursor,
                    attempt = ctx.attempt,
                    error = %err,
                    "backfill step failed"
                );
                Outcome::Stopped
            }
        }
    }

    async fn walk(&self, task: &BackfillTask) -> Result<Outcome, AmblerError> {
        let fetch = self
            .feed
            .fetch(&task.cursor, self.config.page_size, SortOrder::Descending);
        let page = match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(result) => result?,
            Err(_) => return Err(FeedError::Timeout(self.config.fetch_timeout).into()),
        };

        if page.last_created_at > task.start_time {
            // More history to walk: exactly one successor, same boundary,
            // eligible only after the throttle delay.
            let next = BackfillTask {
                cursor: page.next_cursor,
                start_time: task.start_time,
            };
            self.submitter
                .submit_task(next.clone(), self.config.continuation_delay)
                .await?;
            Ok(Outcome::Continued(next))
        } else {
            Ok(Outcome::Stopped)
        }
    }
}

#[async_trait]
impl Handler<BackfillTask> for BackfillWalker {
    async fn handle(&self, ctx: &TaskContext, task: BackfillTask) -> Result<(), AmblerError> {
        // Errors never escape the walker: the task completes either way and
        // the chain simply stops advancing.
        self.process(ctx, &task).await;
        Ok(())
    }
}
