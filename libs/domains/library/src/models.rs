//! Wire and domain models for library events.
//!
//! The wire format is JSON:
//!
//! ```json
//! {"id": 1, "type": "NEW", "book": {"id": 1, "name": "Dune", "author": "Herbert"}}
//! ```
//!
//! `id` is null for events that have not been persisted yet.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Event kind carried in the wire `type` field.
///
/// Kinds added by future producers deserialize as `Unknown` so a consumer
/// running older code logs and skips them instead of failing the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    New,
    Update,
    #[serde(other)]
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::New => "NEW",
            EventKind::Update => "UPDATE",
            EventKind::Unknown => "UNKNOWN",
        }
    }

    /// Parse the stored form, mapping anything unrecognized to `Unknown`.
    pub fn parse(value: &str) -> EventKind {
        match value {
            "NEW" => EventKind::New,
            "UPDATE" => EventKind::Update,
            _ => EventKind::Unknown,
        }
    }
}

/// Book attached to a library event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Book {
    pub id: i32,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub author: String,
}

/// A library event as it travels over the stream and rests in the database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEvent {
    pub id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub book: Book,
}

impl LibraryEvent {
    /// Partitioning key: the event id widened to the stream key type.
    pub fn key(&self) -> Option<i64> {
        self.id.map(i64::from)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// HTTP request body for the producer endpoints.
///
/// The event kind is not part of the request; the endpoint determines it
/// (POST tags `NEW`, PUT tags `UPDATE`).
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct LibraryEventRequest {
    pub id: Option<i32>,
    #[validate(nested)]
    pub book: Book,
}

impl LibraryEventRequest {
    pub fn into_event(self, kind: EventKind) -> LibraryEvent {
        LibraryEvent {
            id: self.id,
            kind,
            book: self.book,
        }
    }
}
