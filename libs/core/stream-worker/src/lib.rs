//! Stream Worker Framework
//!
//! A partitioned Redis Streams worker framework for processing keyed
//! messages with bounded in-place retry and recovery dispatch.
//!
//! ## Features
//!
//! - **Partitioned streams**: messages with the same key always land on the
//!   same partition, each consumed by a single sequential worker task
//! - **Consumer groups**: unacknowledged entries are redelivered on restart
//! - **Bounded retry**: failed deliveries are retried in place with a fixed
//!   backoff; the partition does not advance until a terminal outcome
//! - **Recovery dispatch**: retryable failures that exhaust the attempt
//!   budget are re-published to a recovery stream with their original
//!   key and payload
//! - **Health endpoints**: liveness/readiness probes plus Prometheus metrics
//!
//! ## Example
//!
//! ```ignore
//! use stream_worker::{RetryPolicy, StreamDef, StreamWorker, WorkerConfig};
//!
//! struct MyStream;
//! impl StreamDef for MyStream {
//!     const STREAM_NAME: &'static str = "my:events";
//!     const CONSUMER_GROUP: &'static str = "my_workers";
//!     const RECOVERY_STREAM: &'static str = "my:events:recovery";
//! }
//!
//! let config = WorkerConfig::from_stream_def::<MyStream>()
//!     .with_retry(RetryPolicy::default());
//! let worker = StreamWorker::new(redis, processor, config);
//! worker.run(shutdown_rx).await?;
//! ```

mod config;
mod consumer;
mod engine;
mod error;
mod health;
mod message;
pub mod metrics;
mod producer;
mod recovery;
mod registry;
mod worker;

// Re-export main types
pub use config::{RetryPolicy, WorkerConfig};
pub use consumer::PartitionConsumer;
pub use engine::{MessageProcessor, Outcome, RetryEngine};
pub use error::{Classification, ProcessError, WorkerError};
pub use health::{health_router, HealthState};
pub use message::{Delivery, RecordMeta};
pub use metrics::{init_metrics, WorkerMetrics};
pub use producer::StreamProducer;
pub use recovery::{RecoveryPublisher, RecoverySink};
pub use registry::{partition_stream, StreamDef};
pub use worker::StreamWorker;
