//! Stream definitions.
//!
//! A `StreamDef` ties together the names a producer and a worker must agree
//! on: the partitioned primary stream, the consumer group, and the recovery
//! stream for exhausted messages.

/// Compile-time definition of a partitioned stream.
pub trait StreamDef {
    /// Base name of the primary stream. Partition `p` lives at
    /// `"{STREAM_NAME}:{p}"`.
    const STREAM_NAME: &'static str;

    /// Consumer group used by workers.
    const CONSUMER_GROUP: &'static str;

    /// Stream that receives messages whose retry budget is exhausted.
    const RECOVERY_STREAM: &'static str;

    /// Number of partitions. One sequential worker task per partition.
    const PARTITIONS: u32 = 3;

    /// Approximate maximum stream length per partition (MAXLEN ~).
    const MAX_LENGTH: i64 = 100_000;

    fn stream_name() -> &'static str {
        Self::STREAM_NAME
    }

    fn consumer_group() -> &'static str {
        Self::CONSUMER_GROUP
    }

    fn recovery_stream() -> &'static str {
        Self::RECOVERY_STREAM
    }

    fn partitions() -> u32 {
        Self::PARTITIONS
    }
}

/// Name of a single partition of a stream.
pub fn partition_stream(stream_name: &str, partition: u32) -> String {
    format!("{}:{}", stream_name, partition)
}
