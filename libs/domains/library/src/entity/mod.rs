//! Sea-ORM entities backing the library domain.

pub mod book;
pub mod library_event;
