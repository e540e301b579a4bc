//! Bounded retry engine.
//!
//! Drives a single delivery to a terminal state: the handler is invoked up
//! to `max_attempts` times with a fixed backoff between attempts, and the
//! failure classification is consulted BEFORE the attempt budget, so a
//! fatal failure never consumes retries. Exhausted retryable deliveries go
//! to the recovery sink exactly once; unclassified failures are re-raised.

use crate::config::RetryPolicy;
use crate::error::{Classification, ProcessError};
use crate::message::Delivery;
use crate::recovery::RecoverySink;
use async_trait::async_trait;
use tracing::{error, warn};

/// Handler invoked once per delivery attempt.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    async fn handle(&self, delivery: &Delivery) -> Result<(), ProcessError>;

    /// Processor name for logging.
    fn name(&self) -> &'static str;
}

/// Terminal state of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handler returned Ok.
    Succeeded { attempts: u32 },
    /// A fatal failure ended processing without further attempts.
    Aborted { attempts: u32 },
    /// Retry budget exhausted; message handed to the recovery sink.
    RecoveryDispatched { attempts: u32 },
}

impl Outcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts }
            | Self::Aborted { attempts }
            | Self::RecoveryDispatched { attempts } => *attempts,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Aborted { .. } => "aborted",
            Self::RecoveryDispatched { .. } => "recovery_dispatched",
        }
    }
}

/// Retry engine bound to a recovery sink.
pub struct RetryEngine<R: RecoverySink> {
    policy: RetryPolicy,
    recovery: R,
}

impl<R: RecoverySink> RetryEngine<R> {
    pub fn new(policy: RetryPolicy, recovery: R) -> Self {
        Self { policy, recovery }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Process one delivery to a terminal outcome.
    ///
    /// Returns Err only for unclassified failures, which the caller must
    /// propagate; everything else is a terminal Ok outcome and the caller
    /// may acknowledge the message.
    pub async fn process<P: MessageProcessor>(
        &self,
        processor: &P,
        delivery: &Delivery,
    ) -> Result<Outcome, ProcessError> {
        let mut attempt: u32 = 1;

        loop {
            match processor.handle(delivery).await {
                Ok(()) => return Ok(Outcome::Succeeded { attempts: attempt }),
                Err(e) => {
                    let classification = e.classify();

                    warn!(
                        processor = processor.name(),
                        stream_id = %delivery.stream_id,
                        partition = delivery.partition,
                        key = ?delivery.key,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        classification = ?classification,
                        "Message attempt failed"
                    );

                    match classification {
                        Some(Classification::Fatal) => {
                            return Ok(Outcome::Aborted { attempts: attempt });
                        }
                        Some(Classification::Transient) => {
                            if attempt < self.policy.max_attempts {
                                tokio::time::sleep(self.policy.backoff).await;
                                attempt += 1;
                            } else {
                                self.recovery
                                    .publish(
                                        delivery.key,
                                        &delivery.payload,
                                        delivery.source.as_deref(),
                                    )
                                    .await;
                                return Ok(Outcome::RecoveryDispatched { attempts: attempt });
                            }
                        }
                        None => {
                            error!(
                                processor = processor.name(),
                                stream_id = %delivery.stream_id,
                                key = ?delivery.key,
                                error = %e,
                                "Unclassified failure, propagating"
                            );
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}

impl<R: RecoverySink + Clone> Clone for RetryEngine<R> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            recovery: self.recovery.clone(),
        }
    }
}
