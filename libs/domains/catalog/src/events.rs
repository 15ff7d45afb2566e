use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Lifecycle state of a logged integration event.
///
/// Rows are created `pending` in the same transaction as the item update and
/// flip to `published` only after the bus confirms delivery.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_state")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventState {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "published")]
    Published,
}

// `DeriveActiveEnum` provides `TryFrom<&str>`; restore `FromStr` (previously
// supplied by strum's `EnumString`, which collides with that `TryFrom`) by
// delegating to it so `str::parse()` keeps working with identical semantics.
impl std::str::FromStr for EventState {
    type Err = sea_orm::DbErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Integration event recording a catalog item price change.
///
/// `old_price` is the last *committed* price, read from the row under lock in
/// the same transaction that applied the change. Delivery to subscribers is
/// at-least-once; `event_id` is the consumer-side deduplication key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChangedIntegrationEvent {
    pub event_id: Uuid,
    pub item_id: i32,
    pub new_price: Decimal,
    pub old_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl PriceChangedIntegrationEvent {
    pub fn new(item_id: i32, new_price: Decimal, old_price: Decimal) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            item_id,
            new_price,
            old_price,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_state_serialization() {
        assert_eq!(EventState::Pending.to_string(), "pending");
        assert_eq!(EventState::Published.to_string(), "published");

        let state: EventState = "published".parse().unwrap();
        assert_eq!(state, EventState::Published);
    }

    #[test]
    fn test_event_payload_round_trip() {
        let event =
            PriceChangedIntegrationEvent::new(42, Decimal::new(1200, 2), Decimal::new(1000, 2));

        let json = serde_json::to_string(&event).unwrap();
        let parsed: PriceChangedIntegrationEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, event);
        assert_eq!(parsed.item_id, 42);
        assert_eq!(parsed.new_price, Decimal::new(1200, 2));
        assert_eq!(parsed.old_price, Decimal::new(1000, 2));
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = PriceChangedIntegrationEvent::new(1, Decimal::ONE, Decimal::ZERO);
        let b = PriceChangedIntegrationEvent::new(1, Decimal::ONE, Decimal::ZERO);
        assert_ne!(a.event_id, b.event_id);
    }
}
