//! Integration tests for the stream producer against real Redis.

use event_bus::{CatalogEventStream, StreamDef, StreamProducer};
use serde::Serialize;
use test_utils::TestRedis;

#[derive(Serialize)]
struct FakeEvent {
    event_id: String,
    item_id: i32,
    new_price: String,
}

#[tokio::test]
async fn test_publish_appends_to_stream() {
    let redis = TestRedis::new().await;
    let producer = StreamProducer::from_stream_def::<CatalogEventStream>(redis.connection());

    let event = FakeEvent {
        event_id: "0192e4a0-0000-7000-8000-000000000001".to_string(),
        item_id: 42,
        new_price: "12.00".to_string(),
    };

    let stream_id = producer.publish(&event, &event.event_id).await.unwrap();
    assert!(stream_id.contains('-'));

    let len = producer.stream_length().await.unwrap();
    assert_eq!(len, 1);
}

#[tokio::test]
async fn test_publish_twice_appends_two_entries() {
    // At-least-once semantics: re-publication is allowed, dedup is the
    // consumer's job via the event_id field.
    let redis = TestRedis::new().await;
    let producer = StreamProducer::from_stream_def::<CatalogEventStream>(redis.connection());

    let event = FakeEvent {
        event_id: "0192e4a0-0000-7000-8000-000000000002".to_string(),
        item_id: 7,
        new_price: "5.50".to_string(),
    };

    producer.publish(&event, &event.event_id).await.unwrap();
    producer.publish(&event, &event.event_id).await.unwrap();

    assert_eq!(producer.stream_length().await.unwrap(), 2);
}

#[tokio::test]
async fn test_entry_carries_event_id_field() {
    let redis = TestRedis::new().await;
    let producer = StreamProducer::from_stream_def::<CatalogEventStream>(redis.connection());

    let event = FakeEvent {
        event_id: "0192e4a0-0000-7000-8000-000000000003".to_string(),
        item_id: 1,
        new_price: "1.00".to_string(),
    };

    producer.publish(&event, &event.event_id).await.unwrap();

    let mut conn = redis.connection();
    let entries: redis::streams::StreamRangeReply = redis::cmd("XRANGE")
        .arg(CatalogEventStream::STREAM_NAME)
        .arg("-")
        .arg("+")
        .query_async(&mut conn)
        .await
        .unwrap();

    assert_eq!(entries.ids.len(), 1);
    let entry = &entries.ids[0];
    let id_field: String = entry.get("event_id").unwrap();
    assert_eq!(id_field, event.event_id);

    let payload: String = entry.get("event").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(parsed["item_id"], 1);
    assert_eq!(parsed["new_price"], "1.00");
}
