use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::events::EventState;

/// Sea-ORM entity for the integration_event_log table (the outbox).
///
/// Rows are inserted in the same transaction as the item mutation they
/// describe and flipped to `published` only after confirmed delivery.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integration_event_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: Uuid,
    pub item_id: i32,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub new_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub old_price: Decimal,
    pub state: EventState,
    pub created_at: DateTimeWithTimeZone,
    pub published_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::events::PriceChangedIntegrationEvent {
    fn from(model: Model) -> Self {
        Self {
            event_id: model.event_id,
            item_id: model.item_id,
            new_price: model.new_price,
            old_price: model.old_price,
            created_at: model.created_at.into(),
        }
    }
}
