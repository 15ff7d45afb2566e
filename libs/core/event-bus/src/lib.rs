//! Event Bus
//!
//! A thin Redis Streams publisher for integration events.
//!
//! The write path of the catalog records integration events durably in the
//! store; this crate only covers the "hand the event to the external bus"
//! step. Delivery is at-least-once: the same event may be re-published by the
//! outbox relay, so every payload carries its event id for consumer-side
//! deduplication.
//!
//! ## Example
//!
//! ```ignore
//! use event_bus::{CatalogEventStream, StreamProducer};
//!
//! let producer = StreamProducer::from_stream_def::<CatalogEventStream>(redis);
//! let stream_id = producer.publish(&event, &event_id.to_string()).await?;
//! ```

mod error;
mod producer;
mod streams;

pub use error::BusError;
pub use producer::StreamProducer;
pub use streams::{CatalogEventStream, MessageKey, StreamDef};
