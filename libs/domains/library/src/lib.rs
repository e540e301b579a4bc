//! Library Domain
//!
//! Domain implementation for library events flowing from the producer API
//! through the partitioned event stream into PostgreSQL.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────┐      ┌─────────────┐
//! │  Handlers   │ ───► │ EventStream  │ ───► │  Processor  │
//! │ (POST/PUT)  │      │ (publisher)  │      │  (consumer) │
//! └─────────────┘      └──────────────┘      └──────┬──────┘
//!                                                   │
//!                                            ┌──────▼──────┐
//!                                            │   Service   │
//!                                            └──────┬──────┘
//!                                                   │
//!                                            ┌──────▼──────┐
//!                                            │ Repository  │
//!                                            └─────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod processor;
pub mod publisher;
pub mod repository;
pub mod service;
pub mod streams;

// Re-export commonly used types
pub use error::{ErrorResponse, LibraryError, LibraryResult};
pub use models::{Book, EventKind, LibraryEvent, LibraryEventRequest};
pub use postgres::PgLibraryEventRepository;
pub use processor::LibraryEventProcessor;
pub use publisher::{EventPublisher, StreamEventPublisher};
pub use repository::{InMemoryLibraryEventRepository, LibraryEventRepository};
pub use service::LibraryEventService;
pub use streams::LibraryEventStream;
