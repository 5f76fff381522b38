use std::{sync::Arc, time::Duration};

use {
    serde::Serialize,
    tokio::{
        sync::Mutex,
        task::JoinHandle,
        time::{Instant, MissedTickBehavior},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use crate::{dispatch::send_all, queue::PendingQueue, sink::DeliverySink};

/// Result of draining the pending queue once.
///
/// `forwarded` counts units attempted, whatever their outcome; `failed` is
/// the subset the sink rejected. Failed units are not re-queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub forwarded: usize,
    pub failed: usize,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.forwarded == 0
    }

    /// Human-readable summary used by the flush endpoint.
    pub fn message(&self) -> String {
        match (self.forwarded, self.failed) {
            (0, _) => "no messages to forward".to_string(),
            (1, 0) => "forwarded 1 message".to_string(),
            (n, 0) => format!("forwarded {n} messages"),
            (n, failed) => format!("forwarded {n} messages ({failed} failed)"),
        }
    }
}

/// Drains the pending queue through the sink.
///
/// Flushes are serialized: a periodic tick and an on-demand request never
/// run their send loops at the same time.
pub struct Flusher {
    queue: Arc<PendingQueue>,
    sink: Arc<dyn DeliverySink>,
    flush_lock: Mutex<()>,
}

impl Flusher {
    pub fn new(queue: Arc<PendingQueue>, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            queue,
            sink,
            flush_lock: Mutex::new(()),
        }
    }

    pub fn queue(&self) -> &Arc<PendingQueue> {
        &self.queue
    }

    /// Snapshot-and-empty the queue, then send the snapshot in FIFO order.
    ///
    /// The queue is already empty when sending starts, so units appended
    /// meanwhile wait for the next flush.
    pub async fn flush(&self) -> FlushReport {
        let _flush = self.flush_lock.lock().await;

        let batch = self.queue.drain_all().await;
        if batch.is_empty() {
            debug!("flush: nothing pending");
            return FlushReport::default();
        }

        let outcome = send_all(self.sink.as_ref(), &batch).await;
        let report = FlushReport {
            forwarded: batch.len(),
            failed: outcome.failed,
        };
        if report.failed > 0 {
            warn!(
                forwarded = report.forwarded,
                failed = report.failed,
                "flush finished with failures, failed units dropped"
            );
        } else {
            info!(forwarded = report.forwarded, "flush finished");
        }
        report
    }

    /// Flush every `interval` until `cancel` fires. The first flush happens
    /// one full interval after the call.
    pub fn spawn_periodic(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let flusher = Arc::clone(self);
        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "periodic flush started");
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("periodic flush stopped");
                        break;
                    },
                    _ = ticker.tick() => {
                        flusher.flush().await;
                    },
                }
            }
        })
    }
}
