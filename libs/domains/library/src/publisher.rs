//! Event publishing for the producer API.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use stream_worker::{RecordMeta, StreamProducer};
use tracing::{error, info};

use crate::error::{LibraryError, LibraryResult};
use crate::models::LibraryEvent;
use crate::streams::LibraryEventStream;

/// Source tag attached to every published event.
const EVENT_SOURCE: &str = "scanner";

/// Publisher seam for the HTTP handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &LibraryEvent) -> LibraryResult<RecordMeta>;
}

/// Publishes library events to the partitioned Redis stream.
///
/// The event id doubles as the partitioning key, so updates to one event
/// stay ordered. Events without an id spread round-robin.
#[derive(Clone)]
pub struct StreamEventPublisher {
    producer: StreamProducer,
}

impl StreamEventPublisher {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            producer: StreamProducer::from_stream_def::<LibraryEventStream>(redis),
        }
    }
}

#[async_trait]
impl EventPublisher for StreamEventPublisher {
    async fn publish(&self, event: &LibraryEvent) -> LibraryResult<RecordMeta> {
        let payload = event
            .to_json()
            .map_err(|e| LibraryError::Internal(e.to_string()))?;

        match self
            .producer
            .send_with_source(event.key(), &payload, EVENT_SOURCE)
            .await
        {
            Ok(meta) => {
                info!(
                    event_id = ?event.id,
                    kind = event.kind.as_str(),
                    partition = meta.partition,
                    stream_id = %meta.stream_id,
                    "Published library event"
                );
                Ok(meta)
            }
            Err(e) => {
                error!(event_id = ?event.id, error = %e, "Failed to publish library event");
                Err(LibraryError::Publish(e.to_string()))
            }
        }
    }
}
