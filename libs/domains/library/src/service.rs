use std::sync::Arc;
use stream_worker::ProcessError;
use tracing::{error, info};

use crate::models::{EventKind, LibraryEvent};
use crate::repository::LibraryEventRepository;

/// Business logic for consuming library events.
///
/// Decodes the wire payload, dispatches on the event kind, and persists
/// through the repository. Failures are classified for the retry engine:
/// decode and validation failures are final, a simulated store outage is
/// retryable, and anything else propagates unclassified.
pub struct LibraryEventService<R> {
    repository: Arc<R>,
    simulated_outage_id: Option<i32>,
}

impl<R: LibraryEventRepository> LibraryEventService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            simulated_outage_id: None,
        }
    }

    /// Treat events carrying this id as hitting a store outage, for
    /// exercising the retry and recovery path end to end.
    pub fn with_simulated_outage(mut self, id: i32) -> Self {
        self.simulated_outage_id = Some(id);
        self
    }

    pub async fn process_payload(&self, payload: &str) -> Result<(), ProcessError> {
        let event = LibraryEvent::from_json(payload)?;

        info!(
            event_id = ?event.id,
            kind = event.kind.as_str(),
            book_id = event.book.id,
            "Processing library event"
        );

        // The simulated outage fires on any kind, before the repository
        // is touched.
        if self.simulated_outage_id.is_some() && self.simulated_outage_id == event.id {
            return Err(ProcessError::transient_store("database down"));
        }

        match event.kind {
            EventKind::New => {
                self.save(event).await?;
            }
            EventKind::Update => {
                self.validate(&event).await?;
                self.save(event).await?;
            }
            EventKind::Unknown => {
                error!(event_id = ?event.id, "Skipping library event of unknown kind");
            }
        }

        Ok(())
    }

    /// An update must reference an event that already exists.
    async fn validate(&self, event: &LibraryEvent) -> Result<(), ProcessError> {
        let id = event
            .id
            .ok_or_else(|| ProcessError::validation("library event id is missing"))?;

        let existing = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| ProcessError::other(e.to_string()))?;

        match existing {
            Some(existing) => {
                info!(
                    event_id = id,
                    stored_kind = existing.kind.as_str(),
                    "Validated library event"
                );
                Ok(())
            }
            None => Err(ProcessError::validation(
                "library event not found in database",
            )),
        }
    }

    async fn save(&self, event: LibraryEvent) -> Result<LibraryEvent, ProcessError> {
        let saved = self
            .repository
            .save(event)
            .await
            .map_err(|e| ProcessError::other(e.to_string()))?;

        info!(event_id = ?saved.id, "Saved library event");
        Ok(saved)
    }
}

impl<R> Clone for LibraryEventService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            simulated_outage_id: self.simulated_outage_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;
    use crate::repository::MockLibraryEventRepository;
    use stream_worker::Classification;

    fn event_json(id: &str, kind: &str) -> String {
        format!(
            r#"{{"id":{id},"type":"{kind}","book":{{"id":7,"name":"Dune","author":"Herbert"}}}}"#
        )
    }

    fn stored_event(id: i32) -> LibraryEvent {
        LibraryEvent {
            id: Some(id),
            kind: EventKind::New,
            book: Book {
                id: 7,
                name: "Dune".to_string(),
                author: "Herbert".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_new_event_is_saved() {
        let mut repo = MockLibraryEventRepository::new();
        repo.expect_save()
            .times(1)
            .withf(|e| e.id.is_none() && e.kind == EventKind::New)
            .returning(|mut e| {
                e.id = Some(1);
                Ok(e)
            });

        let service = LibraryEventService::new(repo);
        service
            .process_payload(&event_json("null", "NEW"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_validates_then_saves() {
        let mut repo = MockLibraryEventRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .withf(|id| *id == 5)
            .returning(|id| Ok(Some(stored_event(id))));
        repo.expect_save().times(1).returning(Ok);

        let service = LibraryEventService::new(repo);
        service
            .process_payload(&event_json("5", "UPDATE"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_without_id_is_a_validation_error() {
        let repo = MockLibraryEventRepository::new();

        let service = LibraryEventService::new(repo);
        let err = service
            .process_payload(&event_json("null", "UPDATE"))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), Some(Classification::Fatal));
        assert!(err.to_string().contains("library event id is missing"));
    }

    #[tokio::test]
    async fn test_update_of_unknown_event_is_a_validation_error() {
        let mut repo = MockLibraryEventRepository::new();
        repo.expect_find_by_id().times(1).returning(|_| Ok(None));

        let service = LibraryEventService::new(repo);
        let err = service
            .process_payload(&event_json("5", "UPDATE"))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), Some(Classification::Fatal));
        assert!(err.to_string().contains("not found in database"));
    }

    #[tokio::test]
    async fn test_simulated_outage_is_transient_and_skips_the_store() {
        // No expectations registered: any repository call would panic.
        let repo = MockLibraryEventRepository::new();

        let service = LibraryEventService::new(repo).with_simulated_outage(0);
        let err = service
            .process_payload(&event_json("0", "UPDATE"))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), Some(Classification::Transient));
    }

    #[tokio::test]
    async fn test_simulated_outage_applies_to_new_events_too() {
        // No expectations registered: any repository call would panic.
        let repo = MockLibraryEventRepository::new();

        let service = LibraryEventService::new(repo).with_simulated_outage(0);
        let err = service
            .process_payload(&event_json("0", "NEW"))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), Some(Classification::Transient));
    }

    #[tokio::test]
    async fn test_unknown_kind_is_skipped() {
        let repo = MockLibraryEventRepository::new();

        let service = LibraryEventService::new(repo);
        service
            .process_payload(&event_json("1", "DELETE"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_decode_error() {
        let repo = MockLibraryEventRepository::new();

        let service = LibraryEventService::new(repo);
        let err = service.process_payload("not json").await.unwrap_err();

        assert!(matches!(err, ProcessError::Decode(_)));
        assert_eq!(err.classify(), Some(Classification::Fatal));
    }

    #[tokio::test]
    async fn test_store_failure_is_unclassified() {
        let mut repo = MockLibraryEventRepository::new();
        repo.expect_save().times(1).returning(|_| {
            Err(crate::error::LibraryError::Database(
                "connection reset".to_string(),
            ))
        });

        let service = LibraryEventService::new(repo);
        let err = service
            .process_payload(&event_json("null", "NEW"))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), None);
    }
}
