//! Error taxonomy for stream processing.
//!
//! Processing failures are split into a closed set of kinds. The classifier
//! maps each kind to a `Classification` deciding whether the delivery is
//! retried; kinds outside the registered set classify as `None` and are
//! re-raised to the supervising layer instead of being silently dropped.

use thiserror::Error;

/// How a processing failure is handled by the retry engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not retryable. The delivery is aborted after a single attempt.
    Fatal,
    /// Retryable. The delivery is re-attempted up to the policy's budget,
    /// then dispatched to recovery.
    Transient,
}

/// Failure raised by a message processor.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Payload could not be decoded into an event.
    #[error("decode error: {0}")]
    Decode(String),

    /// Event decoded but failed a domain validation rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// The persistence layer failed in a way expected to heal.
    #[error("transient store error: {0}")]
    TransientStore(String),

    /// Anything outside the registered kinds.
    #[error("{0}")]
    Other(String),
}

impl ProcessError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transient_store(message: impl Into<String>) -> Self {
        Self::TransientStore(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Classify this failure for the retry engine.
    ///
    /// Decode and validation failures are fatal; transient store failures
    /// are retryable. `Other` yields None: the engine re-raises it rather
    /// than guessing.
    pub fn classify(&self) -> Option<Classification> {
        match self {
            Self::Decode(_) | Self::Validation(_) => Some(Classification::Fatal),
            Self::TransientStore(_) => Some(Classification::Transient),
            Self::Other(_) => None,
        }
    }
}

impl From<serde_json::Error> for ProcessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Transport and lifecycle errors of the worker itself.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// An unclassified processing failure propagated out of the engine.
    #[error("processing failure propagated: {0}")]
    Processing(#[from] ProcessError),

    #[error("worker configuration error: {0}")]
    Config(String),

    #[error("partition task failed: {0}")]
    Task(String),
}
