//! Stream definitions and message field keys.

use strum::{AsRefStr, Display, EnumString};

/// Standard message keys used in stream entries.
///
/// These are the field names used when adding entries to Redis streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    /// The event payload (JSON serialized).
    Event,
    /// The event id, duplicated outside the payload so consumers can dedup
    /// without parsing.
    EventId,
}

/// Stream definition trait.
///
/// Each event family implements this trait to pin down its stream
/// configuration, keeping producer and consumers agreed on naming.
///
/// # Example
///
/// ```rust,ignore
/// use event_bus::StreamDef;
///
/// pub struct CatalogEventStream;
///
/// impl StreamDef for CatalogEventStream {
///     const STREAM_NAME: &'static str = "catalog:integration-events";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    /// The Redis stream name.
    const STREAM_NAME: &'static str;

    /// Maximum stream length before auto-trim (MAXLEN).
    /// Default: 100,000 entries.
    const MAX_LENGTH: i64 = 100_000;

    fn stream_name() -> &'static str {
        Self::STREAM_NAME
    }
}

/// The catalog integration-event stream.
///
/// Carries price-changed events published by the catalog write path and the
/// outbox relay. External subscribers consume from here.
pub struct CatalogEventStream;

impl StreamDef for CatalogEventStream {
    const STREAM_NAME: &'static str = "catalog:integration-events";
}
