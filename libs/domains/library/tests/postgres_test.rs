//! Repository tests against a real PostgreSQL container.
//!
//! These tests require a running Docker daemon and are marked `#[ignore]`.
//! Run with: `cargo test -p domain_library -- --ignored`

use domain_library::{
    Book, EventKind, LibraryEvent, LibraryEventRepository, PgLibraryEventRepository,
};
use migration::{Migrator, MigratorTrait};
use test_utils::TestDatabase;

async fn setup() -> (TestDatabase, PgLibraryEventRepository) {
    let db = TestDatabase::new().await;
    Migrator::up(&db.connection(), None)
        .await
        .expect("migrations failed");
    let repo = PgLibraryEventRepository::new(db.connection());
    (db, repo)
}

fn event(id: Option<i32>, kind: EventKind, book_id: i32) -> LibraryEvent {
    LibraryEvent {
        id,
        kind,
        book: Book {
            id: book_id,
            name: "Dune".to_string(),
            author: "Herbert".to_string(),
        },
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_save_assigns_id_and_round_trips() {
    let (_db, repo) = setup().await;

    let saved = repo
        .save(event(None, EventKind::New, 7))
        .await
        .unwrap();
    let id = saved.id.expect("id assigned");

    let found = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.kind, EventKind::New);
    assert_eq!(found.book.id, 7);
    assert_eq!(found.book.name, "Dune");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_replaces_book() {
    let (_db, repo) = setup().await;

    let saved = repo.save(event(None, EventKind::New, 7)).await.unwrap();
    let id = saved.id.unwrap();

    let mut update = event(Some(id), EventKind::Update, 8);
    update.book.name = "Dune Messiah".to_string();
    repo.save(update).await.unwrap();

    let found = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.kind, EventKind::Update);
    assert_eq!(found.book.id, 8);
    assert_eq!(found.book.name, "Dune Messiah");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_save_with_explicit_id_inserts() {
    let (_db, repo) = setup().await;

    let saved = repo
        .save(event(Some(42), EventKind::New, 7))
        .await
        .unwrap();
    assert_eq!(saved.id, Some(42));

    let found = repo.find_by_id(42).await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_same_book_id_can_be_saved_for_two_events() {
    let (_db, repo) = setup().await;

    let first = repo.save(event(None, EventKind::New, 456)).await.unwrap();
    let second = repo.save(event(None, EventKind::New, 456)).await.unwrap();
    assert_ne!(first.id, second.id);

    let found = repo.find_by_id(second.id.unwrap()).await.unwrap().unwrap();
    assert_eq!(found.book.id, 456);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_missing_returns_none() {
    let (_db, repo) = setup().await;
    assert!(repo.find_by_id(999).await.unwrap().is_none());
}
