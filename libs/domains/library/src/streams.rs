//! Stream definitions for the library domain.

use stream_worker::StreamDef;

/// Library events stream.
///
/// The API appends events here; the worker consumes them partition by
/// partition. Events that exhaust their retry budget land on the recovery
/// stream with their original key and payload.
pub struct LibraryEventStream;

impl StreamDef for LibraryEventStream {
    const STREAM_NAME: &'static str = "library:events";
    const CONSUMER_GROUP: &'static str = "library_workers";
    const RECOVERY_STREAM: &'static str = "library:events:recovery";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_event_stream_def() {
        assert_eq!(LibraryEventStream::STREAM_NAME, "library:events");
        assert_eq!(LibraryEventStream::CONSUMER_GROUP, "library_workers");
        assert_eq!(LibraryEventStream::RECOVERY_STREAM, "library:events:recovery");
        assert_eq!(LibraryEventStream::PARTITIONS, 3);
    }
}
