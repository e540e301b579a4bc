//! Recovery dispatch for messages whose retry budget is exhausted.
//!
//! The original key and payload are re-published unwrapped so a recovery
//! consumer sees the exact wire format the producer emitted. The publish
//! is single-shot: its outcome is logged and awaited, but never retried,
//! and a failed publish does not fail the consumed message.

use crate::producer::StreamProducer;
use crate::registry::StreamDef;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{error, info};

/// Destination for messages leaving the retry path.
#[async_trait]
pub trait RecoverySink: Send + Sync {
    /// Publish the original key and payload. Must not fail the caller.
    async fn publish(&self, key: Option<i64>, payload: &str, source: Option<&str>);
}

/// Publishes exhausted messages to the recovery stream.
pub struct RecoveryPublisher {
    producer: StreamProducer,
}

impl RecoveryPublisher {
    pub fn new(redis: ConnectionManager, recovery_stream: impl Into<String>, partitions: u32) -> Self {
        Self {
            producer: StreamProducer::new(redis, recovery_stream, partitions),
        }
    }

    /// Create a publisher from a `StreamDef`, targeting its recovery stream.
    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self {
            producer: StreamProducer::new(redis, S::RECOVERY_STREAM, S::PARTITIONS),
        }
    }

    pub fn stream_name(&self) -> &str {
        self.producer.stream_name()
    }
}

#[async_trait]
impl RecoverySink for RecoveryPublisher {
    async fn publish(&self, key: Option<i64>, payload: &str, source: Option<&str>) {
        let result = match source {
            Some(source) => self.producer.send_with_source(key, payload, source).await,
            None => self.producer.send(key, payload).await,
        };

        match result {
            Ok(meta) => {
                info!(
                    stream = %self.producer.stream_name(),
                    stream_id = %meta.stream_id,
                    partition = meta.partition,
                    key = ?key,
                    "Recovery message published"
                );
            }
            Err(e) => {
                error!(
                    stream = %self.producer.stream_name(),
                    key = ?key,
                    payload = %payload,
                    error = %e,
                    "Failed to publish recovery message"
                );
            }
        }
    }
}

impl Clone for RecoveryPublisher {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
        }
    }
}
