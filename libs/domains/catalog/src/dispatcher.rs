//! Outbox dispatch: hand committed events to the bus, mark them published.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use event_bus::{BusError, StreamProducer};

use crate::error::{CatalogError, CatalogResult};
use crate::events::PriceChangedIntegrationEvent;
use crate::repository::EventLogRepository;

/// Publishes one integration event to the external bus.
///
/// Must be safe to call more than once for the same event: delivery is
/// at-least-once and consumers deduplicate by `event_id`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntegrationEventPublisher: Send + Sync {
    async fn publish(&self, event: &PriceChangedIntegrationEvent) -> Result<(), BusError>;
}

/// Publisher backed by the catalog Redis stream.
pub struct RedisIntegrationEventPublisher {
    producer: StreamProducer,
}

impl RedisIntegrationEventPublisher {
    pub fn new(producer: StreamProducer) -> Self {
        Self { producer }
    }
}

#[async_trait]
impl IntegrationEventPublisher for RedisIntegrationEventPublisher {
    async fn publish(&self, event: &PriceChangedIntegrationEvent) -> Result<(), BusError> {
        self.producer
            .publish(event, &event.event_id.to_string())
            .await?;
        Ok(())
    }
}

/// Drives logged events from `pending` to `published`.
///
/// Runs after the mutation commit, and again from the outbox relay for rows
/// an earlier dispatch attempt left behind. A failure at either step leaves
/// the row pending; the durable row is the recovery state, so nothing is
/// ever lost between commit and delivery.
pub struct EventDispatcher {
    publisher: Arc<dyn IntegrationEventPublisher>,
    event_log: Arc<dyn EventLogRepository>,
}

impl EventDispatcher {
    pub fn new(
        publisher: Arc<dyn IntegrationEventPublisher>,
        event_log: Arc<dyn EventLogRepository>,
    ) -> Self {
        Self {
            publisher,
            event_log,
        }
    }

    /// Publish one event and mark its row published.
    pub async fn dispatch(&self, event: &PriceChangedIntegrationEvent) -> CatalogResult<()> {
        self.publisher
            .publish(event)
            .await
            .map_err(|e| CatalogError::Dispatch(e.to_string()))?;

        self.event_log.mark_published(event.event_id).await?;

        info!(
            event_id = %event.event_id,
            item_id = event.item_id,
            "Integration event published"
        );
        Ok(())
    }

    /// Re-drive pending rows, oldest first. Returns the number published.
    ///
    /// Rows that fail again stay pending and are retried on the next sweep.
    pub async fn redrive_pending(&self, batch_size: u64) -> CatalogResult<usize> {
        let pending = self.event_log.pending(batch_size).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut published = 0;
        for event in &pending {
            match self.dispatch(event).await {
                Ok(()) => published += 1,
                Err(e) => {
                    warn!(
                        event_id = %event.event_id,
                        error = %e,
                        "Failed to re-publish pending event; will retry on next sweep"
                    );
                }
            }
        }

        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockEventLogRepository;
    use rust_decimal::Decimal;

    fn event(item_id: i32) -> PriceChangedIntegrationEvent {
        PriceChangedIntegrationEvent::new(item_id, Decimal::new(1200, 2), Decimal::new(1000, 2))
    }

    #[tokio::test]
    async fn test_dispatch_publishes_then_marks_published() {
        let e = event(42);
        let expected_id = e.event_id;

        let mut publisher = MockIntegrationEventPublisher::new();
        publisher
            .expect_publish()
            .withf(move |ev| ev.event_id == expected_id)
            .times(1)
            .returning(|_| Ok(()));

        let mut event_log = MockEventLogRepository::new();
        event_log
            .expect_mark_published()
            .withf(move |id| *id == expected_id)
            .times(1)
            .returning(|_| Ok(()));

        let dispatcher = EventDispatcher::new(Arc::new(publisher), Arc::new(event_log));
        dispatcher.dispatch(&e).await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_row_pending() {
        let e = event(42);

        let mut publisher = MockIntegrationEventPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_| Err(BusError::Config("bus unreachable".to_string())));

        let mut event_log = MockEventLogRepository::new();
        event_log.expect_mark_published().times(0);

        let dispatcher = EventDispatcher::new(Arc::new(publisher), Arc::new(event_log));
        let result = dispatcher.dispatch(&e).await;
        assert!(matches!(result, Err(CatalogError::Dispatch(_))));
    }

    #[tokio::test]
    async fn test_redrive_publishes_all_pending() {
        let events = vec![event(1), event(2), event(3)];
        let pending = events.clone();

        let mut publisher = MockIntegrationEventPublisher::new();
        publisher.expect_publish().times(3).returning(|_| Ok(()));

        let mut event_log = MockEventLogRepository::new();
        event_log
            .expect_pending()
            .times(1)
            .returning(move |_| Ok(pending.clone()));
        event_log
            .expect_mark_published()
            .times(3)
            .returning(|_| Ok(()));

        let dispatcher = EventDispatcher::new(Arc::new(publisher), Arc::new(event_log));
        let published = dispatcher.redrive_pending(10).await.unwrap();
        assert_eq!(published, 3);
    }

    #[tokio::test]
    async fn test_redrive_counts_only_successes() {
        let events = vec![event(1), event(2)];
        let failing_id = events[0].event_id;
        let pending = events.clone();

        let mut publisher = MockIntegrationEventPublisher::new();
        publisher.expect_publish().times(2).returning(move |ev| {
            if ev.event_id == failing_id {
                Err(BusError::Config("bus unreachable".to_string()))
            } else {
                Ok(())
            }
        });

        let mut event_log = MockEventLogRepository::new();
        event_log
            .expect_pending()
            .times(1)
            .returning(move |_| Ok(pending.clone()));
        event_log
            .expect_mark_published()
            .times(1)
            .returning(|_| Ok(()));

        let dispatcher = EventDispatcher::new(Arc::new(publisher), Arc::new(event_log));
        let published = dispatcher.redrive_pending(10).await.unwrap();
        assert_eq!(published, 1);
    }

    #[tokio::test]
    async fn test_redrive_with_no_pending_is_a_noop() {
        let publisher = MockIntegrationEventPublisher::new();

        let mut event_log = MockEventLogRepository::new();
        event_log.expect_pending().times(1).returning(|_| Ok(vec![]));

        let dispatcher = EventDispatcher::new(Arc::new(publisher), Arc::new(event_log));
        assert_eq!(dispatcher.redrive_pending(10).await.unwrap(), 0);
    }
}
