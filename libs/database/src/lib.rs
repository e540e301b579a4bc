//! Database connectors for PostgreSQL and Redis.
//!
//! Provides env-driven configuration, connection establishment with
//! retry-and-backoff, and migration running.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "library_worker").await?;
//! ```

pub mod common;
pub mod postgres;
pub mod redis;

pub use common::{DatabaseError, DatabaseResult};
