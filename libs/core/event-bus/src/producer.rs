//! Stream producer for publishing integration events.
//!
//! # Example
//!
//! ```rust,ignore
//! use event_bus::{CatalogEventStream, StreamProducer};
//!
//! let producer = StreamProducer::from_stream_def::<CatalogEventStream>(redis);
//! let stream_id = producer.publish(&event, &event.event_id.to_string()).await?;
//! ```

use crate::error::BusError;
use crate::streams::{MessageKey, StreamDef};
use redis::aio::ConnectionManager;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Publishes serialized events onto a Redis stream.
///
/// Publication uses `XADD` with approximate `MAXLEN ~` trimming so the stream
/// cannot grow without bound. Every entry carries the event id as a separate
/// field, letting consumers deduplicate redeliveries without parsing the
/// payload.
pub struct StreamProducer {
    redis: Arc<ConnectionManager>,
    stream_name: String,
    max_length: i64,
}

impl StreamProducer {
    /// Create a new StreamProducer for a specific stream.
    pub fn new(redis: ConnectionManager, stream_name: impl Into<String>) -> Self {
        Self {
            redis: Arc::new(redis),
            stream_name: stream_name.into(),
            max_length: 100_000,
        }
    }

    /// Create a producer from a `StreamDef` implementation.
    ///
    /// This is the recommended constructor: it keeps the stream name and max
    /// length consistent with what consumers expect.
    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self {
            redis: Arc::new(redis),
            stream_name: S::STREAM_NAME.to_string(),
            max_length: S::MAX_LENGTH,
        }
    }

    /// Create from an Arc<ConnectionManager> (for sharing connections).
    pub fn from_arc<S: StreamDef>(redis: Arc<ConnectionManager>) -> Self {
        Self {
            redis,
            stream_name: S::STREAM_NAME.to_string(),
            max_length: S::MAX_LENGTH,
        }
    }

    /// Set the maximum stream length (MAXLEN ~).
    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    /// Get the stream name.
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Publish an event.
    ///
    /// Returns the Redis stream entry id. Safe to call more than once for the
    /// same event: consumers dedup on the `event_id` field.
    pub async fn publish<E: Serialize>(
        &self,
        event: &E,
        event_id: &str,
    ) -> Result<String, BusError> {
        let mut conn = (*self.redis).clone();

        let payload = serde_json::to_string(event)?;

        // XADD with MAXLEN ~ for approximate trimming (more efficient)
        let stream_id: String = redis::cmd("XADD")
            .arg(&self.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg(MessageKey::Event.as_ref())
            .arg(&payload)
            .arg(MessageKey::EventId.as_ref())
            .arg(event_id)
            .query_async(&mut conn)
            .await?;

        debug!(
            stream = %self.stream_name,
            stream_id = %stream_id,
            event_id = %event_id,
            "Published integration event"
        );

        Ok(stream_id)
    }

    /// Get the current stream length.
    pub async fn stream_length(&self) -> Result<i64, BusError> {
        use redis::AsyncCommands;

        let mut conn = (*self.redis).clone();
        let len: i64 = conn.xlen(&self.stream_name).await?;
        Ok(len)
    }
}

impl Clone for StreamProducer {
    fn clone(&self) -> Self {
        Self {
            redis: self.redis.clone(),
            stream_name: self.stream_name.clone(),
            max_length: self.max_length,
        }
    }
}
