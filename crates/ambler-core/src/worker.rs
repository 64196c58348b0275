use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::error;

use crate::queue::Queue;
use crate::runtime::Runtime;
use crate::typed::TaskContext;

/// Worker group handle.
/// - `request_shutdown()` で新規リースの取得を止める
/// - `join` 相当は `shutdown_and_join()` で待てる
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers.
    ///
    /// A backfill deployment passes `n = 1`: the feed walk must stay strictly
    /// sequential, so exactly one task may be in flight at a time.
    pub fn spawn(n: usize, queue: Arc<dyn Queue>, runtime: Arc<Runtime>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let q = Arc::clone(&queue);
            let rt = Arc::clone(&runtime);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, q, rt, &mut rx).await;
            });
            joins.push(join);
        }

        Self { shutdown_tx, joins }
    }

    /// Request shutdown for all workers.
    /// This does not forcibly cancel in-flight handler execution; it just
    /// stops taking new leases.
    pub fn request_shutdown(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for j in self.joins {
            let _ = j.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<dyn Queue>,
    runtime: Arc<Runtime>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        // shutdown が来ていたら抜ける
        if *shutdown_rx.borrow() {
            break;
        }

        // lease は「待つ」可能性があるので select で shutdown と競合させる
        let lease = tokio::select! {
            _ = shutdown_rx.changed() => {
                // 変更が入ったら次のループで判定
                continue;
            }
            lease = queue.lease() => lease,
        };

        let Some(lease) = lease else {
            tokio::task::yield_now().await;
            continue;
        };

        // ここから先は handler 実行（await がある）
        // 重要: Queue 内部ロックは lease() の中で完結している前提（ロック跨ぎ await しない）
        let ctx = TaskContext {
            task_id: lease.envelope().task_id(),
            attempt: lease.attempt(),
        };
        let envelope = lease.envelope().clone(); // handler 実行に必要な分だけ owned にする

        match runtime.execute(&ctx, &envelope).await {
            Ok(()) => {
                if let Err(e) = lease.ack().await {
                    error!(worker_id, error = %e, "ack failed");
                }
            }
            Err(err) => {
                // 失敗を queue に反映（at-most-once なので queue 側で terminal になる）
                if let Err(e) = lease.fail(err.to_string()).await {
                    error!(worker_id, error = %e, "failure report failed");
                }
            }
        }
    }
}
