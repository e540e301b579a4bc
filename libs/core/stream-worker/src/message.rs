//! Raw message representation on the wire.
//!
//! Entries carry an optional integer `key` (routing and ordering), an
//! opaque `payload` (the producer's serialized event), and an optional
//! `source` tag identifying the producing system.

/// Stream entry field holding the routing key.
pub(crate) const KEY_FIELD: &str = "key";
/// Stream entry field holding the raw payload.
pub(crate) const PAYLOAD_FIELD: &str = "payload";
/// Stream entry field holding the producing system tag.
pub(crate) const SOURCE_FIELD: &str = "source";

/// A message delivered from a partition, pending acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Redis stream entry ID.
    pub stream_id: String,
    /// Partition the message was read from.
    pub partition: u32,
    /// Routing key (None for keyless messages).
    pub key: Option<i64>,
    /// Raw payload as produced.
    pub payload: String,
    /// Producing system tag, if the producer attached one.
    pub source: Option<String>,
}

impl Delivery {
    /// Build a delivery from raw XREADGROUP entry fields.
    ///
    /// Returns None when the entry has no payload field; such entries are
    /// transport-level garbage and cannot be processed.
    pub(crate) fn from_fields(
        stream_id: String,
        partition: u32,
        fields: &[(String, String)],
    ) -> Option<Self> {
        let mut key = None;
        let mut payload = None;
        let mut source = None;

        for (name, value) in fields {
            match name.as_str() {
                KEY_FIELD => key = value.parse::<i64>().ok(),
                PAYLOAD_FIELD => payload = Some(value.clone()),
                SOURCE_FIELD => source = Some(value.clone()),
                _ => {}
            }
        }

        Some(Self {
            stream_id,
            partition,
            key,
            payload: payload?,
            source,
        })
    }
}

/// Where a produced record landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    /// Partition the record was appended to.
    pub partition: u32,
    /// Redis stream entry ID.
    pub stream_id: String,
}
