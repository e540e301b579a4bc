//! Stream processor for library events.

use async_trait::async_trait;
use std::sync::Arc;
use stream_worker::{Delivery, MessageProcessor, ProcessError};

use crate::repository::LibraryEventRepository;
use crate::service::LibraryEventService;

/// Adapts `LibraryEventService` to the stream worker's processor interface.
pub struct LibraryEventProcessor<R> {
    service: Arc<LibraryEventService<R>>,
}

impl<R: LibraryEventRepository> LibraryEventProcessor<R> {
    pub fn new(service: LibraryEventService<R>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[async_trait]
impl<R: LibraryEventRepository + 'static> MessageProcessor for LibraryEventProcessor<R> {
    async fn handle(&self, delivery: &Delivery) -> Result<(), ProcessError> {
        self.service.process_payload(&delivery.payload).await
    }

    fn name(&self) -> &'static str {
        "LibraryEventProcessor"
    }
}

impl<R> Clone for LibraryEventProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
