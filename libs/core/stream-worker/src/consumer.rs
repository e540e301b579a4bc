//! Consumer for a single stream partition.
//!
//! Reads through a consumer group so entries that were delivered but never
//! acknowledged (worker crash mid-message) are replayed on restart.

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::message::Delivery;
use crate::registry::partition_stream;
use redis::aio::ConnectionManager;
use redis::RedisResult;
use tracing::{debug, info, warn};

type RawStreams = Vec<(String, Vec<(String, Vec<(String, String)>)>)>;

/// Consumer bound to one partition of a stream.
pub struct PartitionConsumer {
    redis: ConnectionManager,
    stream: String,
    partition: u32,
    consumer_group: String,
    consumer_id: String,
    block_timeout_ms: u64,
}

impl PartitionConsumer {
    pub fn new(redis: ConnectionManager, config: &WorkerConfig, partition: u32) -> Self {
        Self {
            redis,
            stream: partition_stream(&config.stream_name, partition),
            partition,
            consumer_group: config.consumer_group.clone(),
            consumer_id: config.consumer_id.clone(),
            block_timeout_ms: config.block_timeout_ms,
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn partition(&self) -> u32 {
        self.partition
    }

    /// Initialize the consumer group if it doesn't exist.
    pub async fn init_consumer_group(&self) -> Result<(), WorkerError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.stream)
            .arg(&self.consumer_group)
            .arg("0") // Start from beginning
            .arg("MKSTREAM") // Create stream if it doesn't exist
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => {
                info!(
                    stream = %self.stream,
                    group = %self.consumer_group,
                    "Created consumer group"
                );
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.stream,
                    group = %self.consumer_group,
                    "Consumer group already exists"
                );
            }
            Err(e) => return Err(WorkerError::Redis(e)),
        }

        Ok(())
    }

    /// Read messages that were delivered to this consumer but never
    /// acknowledged. Called once at startup before reading new entries.
    pub async fn read_pending(&self, count: usize) -> Result<Vec<Delivery>, WorkerError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<RawStreams> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.consumer_group)
            .arg(&self.consumer_id)
            .arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(&self.stream)
            .arg("0") // Pending entries only
            .query_async(&mut conn)
            .await;

        match result {
            Ok(streams) => self.parse_streams(streams).await,
            Err(e) if e.to_string().contains("NOGROUP") => Ok(vec![]),
            Err(e) => Err(WorkerError::Redis(e)),
        }
    }

    /// Read the next new message, blocking up to the configured timeout.
    ///
    /// Returns None on timeout so the caller can re-check its shutdown flag.
    pub async fn read_next(&self) -> Result<Option<Delivery>, WorkerError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<Option<RawStreams>> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.consumer_group)
            .arg(&self.consumer_id)
            .arg("BLOCK")
            .arg(self.block_timeout_ms)
            .arg("COUNT")
            .arg(1)
            .arg("STREAMS")
            .arg(&self.stream)
            .arg(">") // New messages only
            .query_async(&mut conn)
            .await;

        match result {
            Ok(Some(streams)) => Ok(self.parse_streams(streams).await?.into_iter().next()),
            Ok(None) => Ok(None), // Blocking timeout
            Err(e) if e.to_string().contains("NOGROUP") => Ok(None),
            Err(e) => Err(WorkerError::Redis(e)),
        }
    }

    /// Acknowledge a message, allowing the partition to advance past it.
    pub async fn ack(&self, stream_id: &str) -> Result<(), WorkerError> {
        let mut conn = self.redis.clone();

        let _: i64 = redis::cmd("XACK")
            .arg(&self.stream)
            .arg(&self.consumer_group)
            .arg(stream_id)
            .query_async(&mut conn)
            .await?;

        debug!(stream_id = %stream_id, "Acknowledged message");
        Ok(())
    }

    /// Turn raw XREADGROUP output into deliveries.
    ///
    /// Entries without a payload field cannot be processed; they are
    /// acknowledged and skipped so they do not stall the partition.
    async fn parse_streams(&self, streams: RawStreams) -> Result<Vec<Delivery>, WorkerError> {
        let mut deliveries = Vec::new();

        for (_stream, entries) in streams {
            for (stream_id, fields) in entries {
                match Delivery::from_fields(stream_id.clone(), self.partition, &fields) {
                    Some(delivery) => deliveries.push(delivery),
                    None => {
                        warn!(
                            stream = %self.stream,
                            stream_id = %stream_id,
                            "Entry has no payload field, acknowledging and skipping"
                        );
                        self.ack(&stream_id).await?;
                    }
                }
            }
        }

        Ok(deliveries)
    }
}
