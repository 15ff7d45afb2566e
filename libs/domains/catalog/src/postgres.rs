use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{catalog_brand, catalog_item, catalog_type, event_log};
use crate::error::{CatalogError, CatalogResult};
use crate::events::{EventState, PriceChangedIntegrationEvent};
use crate::models::{
    CatalogBrand, CatalogItem, CatalogType, CreateCatalogItem, UpdateCatalogItem,
};
use crate::repository::{CatalogRepository, EventLogRepository, ItemMutation};

fn embedding_to_json(embedding: &[f32]) -> CatalogResult<serde_json::Value> {
    serde_json::to_value(embedding)
        .map_err(|e| CatalogError::Store(format!("Failed to serialize embedding: {e}")))
}

pub struct PgCatalogRepository {
    db: DatabaseConnection,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create_item(
        &self,
        input: CreateCatalogItem,
        embedding: Option<Vec<f32>>,
    ) -> CatalogResult<CatalogItem> {
        let embedding_json = match embedding.as_deref() {
            Some(v) => Some(embedding_to_json(v)?),
            None => None,
        };
        let now = Utc::now();

        let active = catalog_item::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            picture_file_name: Set(input.picture_file_name),
            catalog_brand_id: Set(input.catalog_brand_id),
            catalog_type_id: Set(input.catalog_type_id),
            available_stock: Set(input.available_stock),
            restock_threshold: Set(input.restock_threshold),
            max_stock_threshold: Set(input.max_stock_threshold),
            embedding: Set(embedding_json),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active.insert(&self.db).await?;

        tracing::info!(item_id = model.id, "Created catalog item");
        Ok(model.into())
    }

    async fn get_item(&self, id: i32) -> CatalogResult<Option<CatalogItem>> {
        let model = catalog_item::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(|m| m.into()))
    }

    async fn list_items(&self, offset: u64, limit: u64) -> CatalogResult<Vec<CatalogItem>> {
        let models = catalog_item::Entity::find()
            .order_by_asc(catalog_item::Column::Name)
            .order_by_asc(catalog_item::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn count_items(&self) -> CatalogResult<u64> {
        let count = catalog_item::Entity::find().count(&self.db).await?;
        Ok(count)
    }

    async fn update_item(
        &self,
        id: i32,
        update: UpdateCatalogItem,
        embedding: Option<Vec<f32>>,
    ) -> CatalogResult<ItemMutation> {
        let embedding_json = match embedding.as_deref() {
            Some(v) => Some(embedding_to_json(v)?),
            None => None,
        };

        let txn = self.db.begin().await?;

        // Row lock serializes concurrent updaters: the price read here is the
        // last committed one, so two racing updates cannot both observe the
        // same original price.
        let row = catalog_item::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        let old_price = row.price;
        let price_changed = old_price != update.price;

        let mut active: catalog_item::ActiveModel = row.into();
        active.name = Set(update.name);
        active.description = Set(update.description);
        active.price = Set(update.price);
        active.picture_file_name = Set(update.picture_file_name);
        active.catalog_brand_id = Set(update.catalog_brand_id);
        active.catalog_type_id = Set(update.catalog_type_id);
        active.available_stock = Set(update.available_stock);
        active.restock_threshold = Set(update.restock_threshold);
        active.max_stock_threshold = Set(update.max_stock_threshold);
        if let Some(json) = embedding_json {
            active.embedding = Set(Some(json));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;

        // The event row rides the same transaction as the item update; either
        // both commit or neither does.
        let price_event = if price_changed {
            let event = PriceChangedIntegrationEvent::new(id, update.price, old_price);
            event_log::ActiveModel {
                event_id: Set(event.event_id),
                item_id: Set(event.item_id),
                new_price: Set(event.new_price),
                old_price: Set(event.old_price),
                state: Set(EventState::Pending),
                created_at: Set(event.created_at.into()),
                published_at: Set(None),
            }
            .insert(&txn)
            .await?;
            Some(event)
        } else {
            None
        };

        txn.commit().await?;

        tracing::info!(
            item_id = id,
            price_changed,
            "Updated catalog item"
        );
        Ok(ItemMutation {
            item: updated.into(),
            price_event,
        })
    }

    async fn delete_item(&self, id: i32) -> CatalogResult<bool> {
        let result = catalog_item::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(item_id = id, "Deleted catalog item");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count_by_name_prefix(&self, prefix: &str) -> CatalogResult<u64> {
        let count = catalog_item::Entity::find()
            .filter(catalog_item::Column::Name.starts_with(prefix))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_by_name_prefix(
        &self,
        prefix: &str,
        offset: u64,
        limit: u64,
    ) -> CatalogResult<Vec<CatalogItem>> {
        let models = catalog_item::Entity::find()
            .filter(catalog_item::Column::Name.starts_with(prefix))
            .order_by_asc(catalog_item::Column::Name)
            .order_by_asc(catalog_item::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn items_for_ranking(&self) -> CatalogResult<Vec<CatalogItem>> {
        let models = catalog_item::Entity::find()
            .order_by_asc(catalog_item::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn list_brands(&self) -> CatalogResult<Vec<CatalogBrand>> {
        let models = catalog_brand::Entity::find()
            .order_by_asc(catalog_brand::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn list_types(&self) -> CatalogResult<Vec<CatalogType>> {
        let models = catalog_type::Entity::find()
            .order_by_asc(catalog_type::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

pub struct PgEventLogRepository {
    db: DatabaseConnection,
}

impl PgEventLogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventLogRepository for PgEventLogRepository {
    async fn pending(&self, limit: u64) -> CatalogResult<Vec<PriceChangedIntegrationEvent>> {
        let models = event_log::Entity::find()
            .filter(event_log::Column::State.eq(EventState::Pending))
            .order_by_asc(event_log::Column::CreatedAt)
            .order_by_asc(event_log::Column::EventId)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn mark_published(&self, event_id: Uuid) -> CatalogResult<()> {
        let row = event_log::Entity::find_by_id(event_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                CatalogError::Store(format!("integration event {event_id} not found"))
            })?;

        let mut active: event_log::ActiveModel = row.into();
        active.state = Set(EventState::Published);
        active.published_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;

        tracing::debug!(event_id = %event_id, "Marked integration event published");
        Ok(())
    }
}
