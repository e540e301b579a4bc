//! Worker and retry configuration.
//!
//! Both structs are plain data constructed at the composition root and
//! passed down explicitly; nothing here reads the environment.

use crate::registry::StreamDef;
use std::time::Duration;
use uuid::Uuid;

/// Bounded retry policy for a single delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total handler invocations per delivery, including the first.
    pub max_attempts: u32,
    /// Fixed delay between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.backoff = Duration::from_millis(backoff_ms);
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1000),
        }
    }
}

/// Configuration for a partitioned stream worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base stream name (partition `p` is `"{stream_name}:{p}"`).
    pub stream_name: String,
    /// Consumer group name.
    pub consumer_group: String,
    /// Unique consumer ID within the group.
    pub consumer_id: String,
    /// Stream receiving messages whose retry budget is exhausted.
    pub recovery_stream: String,
    /// Number of partitions, one sequential task each.
    pub partitions: u32,
    /// Retry policy applied to every delivery.
    pub retry: RetryPolicy,
    /// XREADGROUP BLOCK timeout; bounds shutdown latency.
    pub block_timeout_ms: u64,
    /// Approximate maximum stream length per partition.
    pub max_length: i64,
}

impl WorkerConfig {
    pub fn new(
        stream_name: impl Into<String>,
        consumer_group: impl Into<String>,
        recovery_stream: impl Into<String>,
    ) -> Self {
        Self {
            stream_name: stream_name.into(),
            consumer_group: consumer_group.into(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            recovery_stream: recovery_stream.into(),
            partitions: 3,
            retry: RetryPolicy::default(),
            block_timeout_ms: 1000,
            max_length: 100_000,
        }
    }

    /// Build a config from a `StreamDef`.
    ///
    /// Recommended: keeps producer and worker agreeing on names and
    /// partition count.
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self {
            stream_name: S::STREAM_NAME.to_string(),
            consumer_group: S::CONSUMER_GROUP.to_string(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            recovery_stream: S::RECOVERY_STREAM.to_string(),
            partitions: S::PARTITIONS,
            retry: RetryPolicy::default(),
            block_timeout_ms: 1000,
            max_length: S::MAX_LENGTH,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_partitions(mut self, partitions: u32) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    pub fn with_block_timeout(mut self, block_timeout_ms: u64) -> Self {
        self.block_timeout_ms = block_timeout_ms;
        self
    }

    pub fn with_consumer_id(mut self, consumer_id: impl Into<String>) -> Self {
        self.consumer_id = consumer_id.into();
        self
    }
}
