//! Partitioned stream worker.
//!
//! Spawns one sequential task per partition. A task drains its pending
//! entries (redeliveries from an earlier run), then reads new entries one
//! at a time, drives each through the retry engine, and acknowledges only
//! terminal outcomes. Unclassified processing failures propagate out of
//! the pool and fail the worker.

use crate::config::WorkerConfig;
use crate::consumer::PartitionConsumer;
use crate::engine::{MessageProcessor, Outcome, RetryEngine};
use crate::error::WorkerError;
use crate::message::Delivery;
use crate::metrics::WorkerMetrics;
use crate::recovery::RecoveryPublisher;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Number of pending entries replayed per read at startup.
const PENDING_BATCH: usize = 100;

/// Acknowledgement attempts before an entry is left pending.
const ACK_ATTEMPTS: u32 = 3;

pub struct StreamWorker<P> {
    redis: ConnectionManager,
    processor: Arc<P>,
    config: WorkerConfig,
}

impl<P: MessageProcessor + 'static> StreamWorker<P> {
    pub fn new(redis: ConnectionManager, processor: P, config: WorkerConfig) -> Self {
        Self {
            redis,
            processor: Arc::new(processor),
            config,
        }
    }

    /// Run partition tasks until shutdown or a fatal error.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        let recovery = RecoveryPublisher::new(
            self.redis.clone(),
            self.config.recovery_stream.clone(),
            self.config.partitions,
        );
        let engine = RetryEngine::new(self.config.retry.clone(), recovery);
        let metrics = WorkerMetrics::new(&self.config.stream_name, self.processor.name());

        info!(
            stream = %self.config.stream_name,
            consumer_group = %self.config.consumer_group,
            consumer_id = %self.config.consumer_id,
            partitions = self.config.partitions,
            max_attempts = self.config.retry.max_attempts,
            backoff_ms = self.config.retry.backoff.as_millis() as u64,
            processor = self.processor.name(),
            "Starting stream worker"
        );

        let mut tasks: JoinSet<Result<(), WorkerError>> = JoinSet::new();

        for partition in 0..self.config.partitions {
            let consumer = PartitionConsumer::new(self.redis.clone(), &self.config, partition);
            let processor = Arc::clone(&self.processor);
            let engine = engine.clone();
            let metrics = metrics.clone();
            let shutdown = shutdown.clone();

            tasks.spawn(async move {
                run_partition(consumer, processor, engine, metrics, shutdown).await
            });
        }

        let mut result = Ok(());

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = %e, "Partition task failed, stopping worker");
                    result = Err(e);
                    tasks.abort_all();
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    error!(error = %e, "Partition task panicked, stopping worker");
                    result = Err(WorkerError::Task(e.to_string()));
                    tasks.abort_all();
                }
            }
        }

        info!(stream = %self.config.stream_name, "Stream worker stopped");
        result
    }
}

async fn run_partition<P: MessageProcessor>(
    consumer: PartitionConsumer,
    processor: Arc<P>,
    engine: RetryEngine<RecoveryPublisher>,
    metrics: WorkerMetrics,
    shutdown: watch::Receiver<bool>,
) -> Result<(), WorkerError> {
    consumer.init_consumer_group().await?;

    // Replay entries delivered before a previous shutdown or crash.
    let pending = consumer.read_pending(PENDING_BATCH).await?;
    if !pending.is_empty() {
        info!(
            stream = %consumer.stream(),
            count = pending.len(),
            "Replaying pending entries"
        );
    }
    for delivery in pending {
        handle_delivery(&consumer, &*processor, &engine, &metrics, delivery).await?;
    }

    info!(stream = %consumer.stream(), "Partition consumer started");

    let mut consecutive_read_errors: u32 = 0;

    loop {
        if *shutdown.borrow() {
            info!(stream = %consumer.stream(), "Shutdown signal received, stopping partition consumer");
            return Ok(());
        }

        match consumer.read_next().await {
            Ok(Some(delivery)) => {
                consecutive_read_errors = 0;
                handle_delivery(&consumer, &*processor, &engine, &metrics, delivery).await?;
            }
            Ok(None) => {
                consecutive_read_errors = 0;
            }
            Err(e) => {
                // Transient transport trouble; back off and let the
                // connection manager reconnect.
                consecutive_read_errors += 1;
                let delay = (consecutive_read_errors as u64 * 500).min(5000);
                warn!(
                    stream = %consumer.stream(),
                    error = %e,
                    consecutive_errors = consecutive_read_errors,
                    delay_ms = delay,
                    "Read failed, backing off"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }
    }
}

/// Drive one delivery to a terminal state and acknowledge it.
///
/// The partition does not advance until this returns; retry backoff stalls
/// it on purpose so per-key ordering holds.
async fn handle_delivery<P: MessageProcessor>(
    consumer: &PartitionConsumer,
    processor: &P,
    engine: &RetryEngine<RecoveryPublisher>,
    metrics: &WorkerMetrics,
    delivery: Delivery,
) -> Result<(), WorkerError> {
    metrics.message_received();
    let started = Instant::now();

    // Err here is an unclassified failure: no ack, propagate. The entry
    // stays pending and is redelivered after restart.
    let outcome = engine.process(processor, &delivery).await?;

    metrics.message_finished(outcome.as_str(), outcome.attempts(), started.elapsed());
    if matches!(outcome, Outcome::RecoveryDispatched { .. }) {
        metrics.recovery_dispatched();
    }

    info!(
        stream = %consumer.stream(),
        stream_id = %delivery.stream_id,
        key = ?delivery.key,
        outcome = outcome.as_str(),
        attempts = outcome.attempts(),
        "Message reached terminal state"
    );

    // The message itself is handled at this point. An ack failure is
    // transient transport trouble like a failed read: back off and retry,
    // and if Redis stays away leave the entry pending. The pending replay
    // at startup re-drives it instead of killing the pool.
    if !ack_with_backoff(|| consumer.ack(&delivery.stream_id)).await {
        warn!(
            stream = %consumer.stream(),
            stream_id = %delivery.stream_id,
            "Acknowledgement failed, entry stays pending and will be redelivered"
        );
    }
    Ok(())
}

/// Retry an acknowledgement with the same backoff schedule as reads.
///
/// Returns false when every attempt failed.
async fn ack_with_backoff<F, Fut>(mut ack: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), WorkerError>>,
{
    for attempt in 1..=ACK_ATTEMPTS {
        match ack().await {
            Ok(()) => return true,
            Err(e) => {
                let delay = (attempt as u64 * 500).min(5000);
                warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay,
                    "Acknowledgement failed, backing off"
                );
                if attempt < ACK_ATTEMPTS {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_ack_retry_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let acked = ack_with_backoff(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(WorkerError::Task("connection reset".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(acked);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ack_retry_gives_up_after_budget() {
        let calls = AtomicU32::new(0);

        let acked = ack_with_backoff(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(WorkerError::Task("still down".to_string())) }
        })
        .await;

        assert!(!acked);
        assert_eq!(calls.load(Ordering::SeqCst), ACK_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_ack_retry_returns_immediately_on_success() {
        let calls = AtomicU32::new(0);

        let acked = ack_with_backoff(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        assert!(acked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
