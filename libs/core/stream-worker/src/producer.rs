//! Stream producer for publishing keyed messages.
//!
//! Messages with the same key always land on the same partition so
//! per-key ordering survives the fan-out; keyless messages round-robin
//! across partitions.

use crate::error::WorkerError;
use crate::message::{RecordMeta, KEY_FIELD, PAYLOAD_FIELD, SOURCE_FIELD};
use crate::registry::{partition_stream, StreamDef};
use redis::aio::ConnectionManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Producer appending keyed messages to a partitioned stream.
pub struct StreamProducer {
    redis: ConnectionManager,
    stream_name: String,
    partitions: u32,
    max_length: i64,
    round_robin: Arc<AtomicU64>,
}

impl StreamProducer {
    pub fn new(redis: ConnectionManager, stream_name: impl Into<String>, partitions: u32) -> Self {
        Self {
            redis,
            stream_name: stream_name.into(),
            partitions: partitions.max(1),
            max_length: 100_000,
            round_robin: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a producer from a `StreamDef` implementation.
    ///
    /// Recommended: keeps stream name and partition count consistent with
    /// the worker.
    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self {
            redis,
            stream_name: S::STREAM_NAME.to_string(),
            partitions: S::PARTITIONS,
            max_length: S::MAX_LENGTH,
            round_robin: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set the approximate maximum stream length (MAXLEN ~).
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Partition for a key: stable modulo for keyed messages, round-robin
    /// for keyless ones.
    pub fn partition_for_key(&self, key: Option<i64>) -> u32 {
        select_partition(key, self.partitions, &self.round_robin)
    }

    /// Append a message.
    ///
    /// Returns the partition and Redis entry ID it landed on.
    pub async fn send(&self, key: Option<i64>, payload: &str) -> Result<RecordMeta, WorkerError> {
        self.send_inner(key, payload, None).await
    }

    /// Append a message with a source tag identifying the producing system.
    pub async fn send_with_source(
        &self,
        key: Option<i64>,
        payload: &str,
        source: &str,
    ) -> Result<RecordMeta, WorkerError> {
        self.send_inner(key, payload, Some(source)).await
    }

    async fn send_inner(
        &self,
        key: Option<i64>,
        payload: &str,
        source: Option<&str>,
    ) -> Result<RecordMeta, WorkerError> {
        let partition = self.partition_for_key(key);
        let stream = partition_stream(&self.stream_name, partition);
        let mut conn = self.redis.clone();

        // XADD with MAXLEN ~ for approximate trimming (more efficient)
        let mut cmd = redis::cmd("XADD");
        cmd.arg(&stream)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*");

        if let Some(key) = key {
            cmd.arg(KEY_FIELD).arg(key.to_string());
        }
        cmd.arg(PAYLOAD_FIELD).arg(payload);
        if let Some(source) = source {
            cmd.arg(SOURCE_FIELD).arg(source);
        }

        let stream_id: String = cmd.query_async(&mut conn).await?;

        debug!(
            stream = %stream,
            stream_id = %stream_id,
            key = ?key,
            "Message appended to stream"
        );

        Ok(RecordMeta {
            partition,
            stream_id,
        })
    }
}

fn select_partition(key: Option<i64>, partitions: u32, round_robin: &AtomicU64) -> u32 {
    match key {
        Some(k) => k.rem_euclid(partitions as i64) as u32,
        None => (round_robin.fetch_add(1, Ordering::Relaxed) % partitions as u64) as u32,
    }
}

impl Clone for StreamProducer {
    fn clone(&self) -> Self {
        Self {
            redis: self.redis.clone(),
            stream_name: self.stream_name.clone(),
            partitions: self.partitions,
            max_length: self.max_length,
            round_robin: Arc::clone(&self.round_robin),
        }
    }
}
