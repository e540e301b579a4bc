use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};

use crate::entity::{book, library_event};
use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, EventKind, LibraryEvent};
use crate::repository::LibraryEventRepository;

/// PostgreSQL repository for library events.
pub struct PgLibraryEventRepository {
    db: DatabaseConnection,
}

impl PgLibraryEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LibraryEventRepository for PgLibraryEventRepository {
    async fn find_by_id(&self, id: i32) -> LibraryResult<Option<LibraryEvent>> {
        let row = library_event::Entity::find_by_id(id)
            .find_also_related(book::Entity)
            .one(&self.db)
            .await?;

        match row {
            None => Ok(None),
            Some((event, Some(book))) => Ok(Some(LibraryEvent {
                id: Some(event.id),
                kind: EventKind::parse(&event.event_type),
                book: Book {
                    id: book.id,
                    name: book.name,
                    author: book.author,
                },
            })),
            Some((event, None)) => Err(LibraryError::Internal(format!(
                "library event {} has no book row",
                event.id
            ))),
        }
    }

    async fn save(&self, event: LibraryEvent) -> LibraryResult<LibraryEvent> {
        let txn = self.db.begin().await?;

        let event_type = event.kind.as_str().to_string();

        let event_id = match event.id {
            None => {
                let inserted = library_event::ActiveModel {
                    id: NotSet,
                    event_type: Set(event_type),
                }
                .insert(&txn)
                .await?;
                inserted.id
            }
            Some(id) => {
                let existing = library_event::Entity::find_by_id(id).one(&txn).await?;
                if existing.is_some() {
                    library_event::ActiveModel {
                        id: Set(id),
                        event_type: Set(event_type),
                    }
                    .update(&txn)
                    .await?;
                    // The book is replaced wholesale on update.
                    book::Entity::delete_many()
                        .filter(book::Column::LibraryEventId.eq(id))
                        .exec(&txn)
                        .await?;
                } else {
                    library_event::ActiveModel {
                        id: Set(id),
                        event_type: Set(event_type),
                    }
                    .insert(&txn)
                    .await?;
                }
                id
            }
        };

        book::ActiveModel {
            id: Set(event.book.id),
            name: Set(event.book.name.clone()),
            author: Set(event.book.author.clone()),
            library_event_id: Set(event_id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(event_id, kind = event.kind.as_str(), "Persisted library event");

        Ok(LibraryEvent {
            id: Some(event_id),
            ..event
        })
    }
}
