mod config;
mod sim_feed;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ambler_core::backfill::{BackfillTask, BackfillWalker, Cursor, Submitter};
use ambler_core::queue::{InMemoryQueue, Queue};
use ambler_core::runtime::Runtime;
use ambler_core::typed::TypedRegistry;
use ambler_core::worker::WorkerGroup;

use crate::config::AppConfig;
use crate::sim_feed::SimulatedFeed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!(run_worker = config.run_worker, "starting ambler");

    // (A) Queue, feed and walker wiring
    let queue = Arc::new(InMemoryQueue::new(config.retention_policy()));
    let submitter = Submitter::new(queue.clone());

    let now = Utc::now();
    let feed = Arc::new(SimulatedFeed::generate(
        config.feed.pages,
        now,
        chrono::Duration::seconds(config.feed.page_step_secs as i64),
    ));
    let walker = BackfillWalker::with_config(feed, submitter.clone(), config.walker_config());

    let mut registry = TypedRegistry::new();
    registry.register::<BackfillTask, _>(walker)?;
    let runtime = Arc::new(Runtime::new(Arc::new(registry)));

    // (B) Worker - exactly one, and only on processes designated to consume.
    // With run_worker disabled this process just seeds the queue.
    let workers = config
        .run_worker
        .then(|| WorkerGroup::spawn(1, queue.clone(), runtime));

    // (C) Seed the chain: walk back until the configured window is covered.
    let start_time = now - chrono::Duration::seconds(config.feed.backfill_window_secs as i64);
    let seed = submitter
        .submit(Cursor::start(), start_time, Duration::ZERO)
        .await?;
    info!(task_id = %seed, boundary = %start_time, "seeded backfill chain");

    let Some(workers) = workers else {
        let counts = queue.counts_by_state().await?;
        info!(
            queued = counts.queued,
            "run_worker disabled; leaving the seed for a consumer process"
        );
        return Ok(());
    };

    // (D) Poll until the chain has fully drained.
    loop {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let counts = queue.counts_by_state().await?;
        if counts.delayed + counts.queued + counts.running == 0 {
            info!(
                succeeded = counts.succeeded,
                failed = counts.failed,
                "backfill chain drained"
            );
            break;
        }
    }

    for attempt in queue.recent_attempts().await {
        info!(
            task_id = %attempt.task_id,
            attempt = attempt.attempt,
            outcome = ?attempt.outcome.kind,
            "attempt record"
        );
    }

    workers.shutdown_and_join().await;
    Ok(())
}
