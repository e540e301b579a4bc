use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::RwLock;

use crate::error::{LibraryError, LibraryResult};
use crate::models::LibraryEvent;

/// Repository trait for library event persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryEventRepository: Send + Sync {
    /// Look up an event by its id, with its book.
    async fn find_by_id(&self, id: i32) -> LibraryResult<Option<LibraryEvent>>;

    /// Insert the event when its id is absent, otherwise replace the stored
    /// event and its book. Returns the event with its assigned id.
    async fn save(&self, event: LibraryEvent) -> LibraryResult<LibraryEvent>;
}

#[async_trait]
impl<T: LibraryEventRepository + ?Sized> LibraryEventRepository for std::sync::Arc<T> {
    async fn find_by_id(&self, id: i32) -> LibraryResult<Option<LibraryEvent>> {
        (**self).find_by_id(id).await
    }

    async fn save(&self, event: LibraryEvent) -> LibraryResult<LibraryEvent> {
        (**self).save(event).await
    }
}

/// In-memory repository for tests and local demos.
pub struct InMemoryLibraryEventRepository {
    events: RwLock<HashMap<i32, LibraryEvent>>,
    next_id: AtomicI32,
}

impl InMemoryLibraryEventRepository {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryLibraryEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LibraryEventRepository for InMemoryLibraryEventRepository {
    async fn find_by_id(&self, id: i32) -> LibraryResult<Option<LibraryEvent>> {
        let events = self
            .events
            .read()
            .map_err(|e| LibraryError::Internal(e.to_string()))?;

        Ok(events.get(&id).cloned())
    }

    async fn save(&self, mut event: LibraryEvent) -> LibraryResult<LibraryEvent> {
        let id = match event.id {
            Some(id) => id,
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        event.id = Some(id);

        let mut events = self
            .events
            .write()
            .map_err(|e| LibraryError::Internal(e.to_string()))?;
        events.insert(id, event.clone());

        Ok(event)
    }
}
