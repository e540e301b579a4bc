//! Shared test infrastructure.
//!
//! Container-backed fixtures for integration tests:
//! - `TestRedis`: Redis container with automatic cleanup
//! - `TestDatabase`: PostgreSQL container with automatic cleanup
//!
//! Tests using these fixtures require a running Docker daemon and are
//! conventionally marked `#[ignore]`.

mod postgres;
mod redis;

pub use postgres::TestDatabase;
pub use redis::TestRedis;
