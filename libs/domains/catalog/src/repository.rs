use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::events::{EventState, PriceChangedIntegrationEvent};
use crate::models::{
    CatalogBrand, CatalogItem, CatalogType, CreateCatalogItem, UpdateCatalogItem,
};

/// Outcome of an item update: the stored row plus the integration event
/// recorded in the same transaction, if the price changed.
#[derive(Debug, Clone)]
pub struct ItemMutation {
    pub item: CatalogItem,
    pub price_event: Option<PriceChangedIntegrationEvent>,
}

/// Repository trait for catalog persistence.
///
/// `update_item` is the outbox write: the row update and the conditional
/// event insert are one atomic unit, and the price diff happens against the
/// row as locked inside that unit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a new item. `embedding` is stored alongside when present.
    async fn create_item(
        &self,
        input: CreateCatalogItem,
        embedding: Option<Vec<f32>>,
    ) -> CatalogResult<CatalogItem>;

    /// Get an item by id.
    async fn get_item(&self, id: i32) -> CatalogResult<Option<CatalogItem>>;

    /// List items ordered by (name, id).
    async fn list_items(&self, offset: u64, limit: u64) -> CatalogResult<Vec<CatalogItem>>;

    /// Full catalog count.
    async fn count_items(&self) -> CatalogResult<u64>;

    /// Apply the full new state to an item, atomically recording a pending
    /// price-changed event when the persisted price differs from
    /// `update.price`. A `None` embedding leaves the stored vector untouched.
    async fn update_item(
        &self,
        id: i32,
        update: UpdateCatalogItem,
        embedding: Option<Vec<f32>>,
    ) -> CatalogResult<ItemMutation>;

    /// Delete an item by id. Returns whether a row was removed.
    async fn delete_item(&self, id: i32) -> CatalogResult<bool>;

    /// Count items whose name starts with `prefix` (case-sensitive).
    async fn count_by_name_prefix(&self, prefix: &str) -> CatalogResult<u64>;

    /// Page of items whose name starts with `prefix`, ordered by (name, id).
    async fn find_by_name_prefix(
        &self,
        prefix: &str,
        offset: u64,
        limit: u64,
    ) -> CatalogResult<Vec<CatalogItem>>;

    /// Every item, ordered by id, embeddings included. Input to the ranking
    /// primitive.
    async fn items_for_ranking(&self) -> CatalogResult<Vec<CatalogItem>>;

    /// Brand reference rows.
    async fn list_brands(&self) -> CatalogResult<Vec<CatalogBrand>>;

    /// Type reference rows.
    async fn list_types(&self) -> CatalogResult<Vec<CatalogType>>;
}

/// Repository trait for the integration event log (the outbox table).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventLogRepository: Send + Sync {
    /// Oldest pending events, up to `limit`.
    async fn pending(&self, limit: u64) -> CatalogResult<Vec<PriceChangedIntegrationEvent>>;

    /// Flip an event to published, stamping the publication time.
    async fn mark_published(&self, event_id: Uuid) -> CatalogResult<()>;
}

#[derive(Debug, Clone)]
struct StoredEvent {
    event: PriceChangedIntegrationEvent,
    state: EventState,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    items: HashMap<i32, CatalogItem>,
    brands: Vec<CatalogBrand>,
    types: Vec<CatalogType>,
    events: Vec<StoredEvent>,
    next_id: i32,
}

/// In-memory implementation of both repositories (for development/testing).
///
/// The write lock is held across the whole diff-and-write of `update_item`,
/// mirroring the row lock the PostgreSQL implementation takes.
#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the brand/type reference data.
    pub async fn seed_reference_data(&self, brands: Vec<CatalogBrand>, types: Vec<CatalogType>) {
        let mut state = self.state.write().await;
        state.brands = brands;
        state.types = types;
    }

    /// Snapshot of the recorded events and their states (test helper).
    pub async fn recorded_events(&self) -> Vec<(PriceChangedIntegrationEvent, EventState)> {
        let state = self.state.read().await;
        state
            .events
            .iter()
            .map(|e| (e.event.clone(), e.state))
            .collect()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn create_item(
        &self,
        input: CreateCatalogItem,
        embedding: Option<Vec<f32>>,
    ) -> CatalogResult<CatalogItem> {
        let mut state = self.state.write().await;

        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();

        let item = CatalogItem {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            picture_file_name: input.picture_file_name,
            catalog_brand_id: input.catalog_brand_id,
            catalog_type_id: input.catalog_type_id,
            available_stock: input.available_stock,
            restock_threshold: input.restock_threshold,
            max_stock_threshold: input.max_stock_threshold,
            embedding,
            created_at: now,
            updated_at: now,
        };
        state.items.insert(id, item.clone());

        tracing::info!(item_id = id, "Created catalog item");
        Ok(item)
    }

    async fn get_item(&self, id: i32) -> CatalogResult<Option<CatalogItem>> {
        let state = self.state.read().await;
        Ok(state.items.get(&id).cloned())
    }

    async fn list_items(&self, offset: u64, limit: u64) -> CatalogResult<Vec<CatalogItem>> {
        let state = self.state.read().await;

        let mut items: Vec<CatalogItem> = state.items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_items(&self) -> CatalogResult<u64> {
        let state = self.state.read().await;
        Ok(state.items.len() as u64)
    }

    async fn update_item(
        &self,
        id: i32,
        update: UpdateCatalogItem,
        embedding: Option<Vec<f32>>,
    ) -> CatalogResult<ItemMutation> {
        // Single write lock across diff-and-write: the in-process equivalent
        // of SELECT ... FOR UPDATE.
        let mut state = self.state.write().await;

        let current = state
            .items
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))?;
        let old_price = current.price;

        let item = CatalogItem {
            id,
            name: update.name,
            description: update.description,
            price: update.price,
            picture_file_name: update.picture_file_name,
            catalog_brand_id: update.catalog_brand_id,
            catalog_type_id: update.catalog_type_id,
            available_stock: update.available_stock,
            restock_threshold: update.restock_threshold,
            max_stock_threshold: update.max_stock_threshold,
            embedding: embedding.or(current.embedding),
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        let price_event = if old_price != item.price {
            let event = PriceChangedIntegrationEvent::new(id, item.price, old_price);
            state.events.push(StoredEvent {
                event: event.clone(),
                state: EventState::Pending,
                published_at: None,
            });
            Some(event)
        } else {
            None
        };

        state.items.insert(id, item.clone());

        tracing::info!(item_id = id, "Updated catalog item");
        Ok(ItemMutation { item, price_event })
    }

    async fn delete_item(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;

        if state.items.remove(&id).is_some() {
            tracing::info!(item_id = id, "Deleted catalog item");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count_by_name_prefix(&self, prefix: &str) -> CatalogResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|i| i.name.starts_with(prefix))
            .count() as u64)
    }

    async fn find_by_name_prefix(
        &self,
        prefix: &str,
        offset: u64,
        limit: u64,
    ) -> CatalogResult<Vec<CatalogItem>> {
        let state = self.state.read().await;

        let mut items: Vec<CatalogItem> = state
            .items
            .values()
            .filter(|i| i.name.starts_with(prefix))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn items_for_ranking(&self) -> CatalogResult<Vec<CatalogItem>> {
        let state = self.state.read().await;

        let mut items: Vec<CatalogItem> = state.items.values().cloned().collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn list_brands(&self) -> CatalogResult<Vec<CatalogBrand>> {
        let state = self.state.read().await;
        Ok(state.brands.clone())
    }

    async fn list_types(&self) -> CatalogResult<Vec<CatalogType>> {
        let state = self.state.read().await;
        Ok(state.types.clone())
    }
}

#[async_trait]
impl EventLogRepository for InMemoryCatalogRepository {
    async fn pending(&self, limit: u64) -> CatalogResult<Vec<PriceChangedIntegrationEvent>> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|e| e.state == EventState::Pending)
            .take(limit as usize)
            .map(|e| e.event.clone())
            .collect())
    }

    async fn mark_published(&self, event_id: Uuid) -> CatalogResult<()> {
        let mut state = self.state.write().await;

        let entry = state
            .events
            .iter_mut()
            .find(|e| e.event.event_id == event_id)
            .ok_or_else(|| {
                CatalogError::Store(format!("integration event {event_id} not found"))
            })?;
        entry.state = EventState::Published;
        entry.published_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn create_input(name: &str, price: Decimal) -> CreateCatalogItem {
        CreateCatalogItem {
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            picture_file_name: None,
            catalog_brand_id: 1,
            catalog_type_id: 1,
            available_stock: 10,
            restock_threshold: 2,
            max_stock_threshold: 20,
        }
    }

    fn update_from(item: &CatalogItem, price: Decimal) -> UpdateCatalogItem {
        UpdateCatalogItem {
            name: item.name.clone(),
            description: item.description.clone(),
            price,
            picture_file_name: item.picture_file_name.clone(),
            catalog_brand_id: item.catalog_brand_id,
            catalog_type_id: item.catalog_type_id,
            available_stock: item.available_stock,
            restock_threshold: item.restock_threshold,
            max_stock_threshold: item.max_stock_threshold,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_item() {
        let repo = InMemoryCatalogRepository::new();

        let item = repo
            .create_item(create_input("Trail Mug", Decimal::new(1000, 2)), None)
            .await
            .unwrap();
        assert_eq!(item.id, 1);

        let fetched = repo.get_item(item.id).await.unwrap();
        assert_eq!(fetched.unwrap().name, "Trail Mug");
    }

    #[tokio::test]
    async fn test_price_change_records_pending_event() {
        let repo = InMemoryCatalogRepository::new();
        let item = repo
            .create_item(create_input("Mug", Decimal::new(1000, 2)), None)
            .await
            .unwrap();

        let mutation = repo
            .update_item(item.id, update_from(&item, Decimal::new(1200, 2)), None)
            .await
            .unwrap();

        let event = mutation.price_event.expect("price change must emit event");
        assert_eq!(event.item_id, item.id);
        assert_eq!(event.new_price, Decimal::new(1200, 2));
        assert_eq!(event.old_price, Decimal::new(1000, 2));

        let events = repo.recorded_events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1, EventState::Pending);
    }

    #[tokio::test]
    async fn test_unchanged_price_records_nothing() {
        let repo = InMemoryCatalogRepository::new();
        let item = repo
            .create_item(create_input("Mug", Decimal::new(1000, 2)), None)
            .await
            .unwrap();

        let mutation = repo
            .update_item(item.id, update_from(&item, Decimal::new(1000, 2)), None)
            .await
            .unwrap();

        assert!(mutation.price_event.is_none());
        assert!(repo.recorded_events().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let repo = InMemoryCatalogRepository::new();
        let item = CatalogItem {
            id: 99,
            name: "ghost".to_string(),
            description: String::new(),
            price: Decimal::ONE,
            picture_file_name: None,
            catalog_brand_id: 1,
            catalog_type_id: 1,
            available_stock: 0,
            restock_threshold: 0,
            max_stock_threshold: 0,
            embedding: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = repo
            .update_item(99, update_from(&item, Decimal::ONE), None)
            .await;
        assert!(matches!(result, Err(CatalogError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_update_keeps_embedding_when_none_given() {
        let repo = InMemoryCatalogRepository::new();
        let item = repo
            .create_item(
                create_input("Mug", Decimal::new(1000, 2)),
                Some(vec![0.1, 0.2]),
            )
            .await
            .unwrap();

        let mutation = repo
            .update_item(item.id, update_from(&item, Decimal::new(1000, 2)), None)
            .await
            .unwrap();
        assert_eq!(mutation.item.embedding, Some(vec![0.1, 0.2]));
    }

    #[tokio::test]
    async fn test_prefix_search_is_case_sensitive_and_ordered() {
        let repo = InMemoryCatalogRepository::new();
        for name in ["Avocado", "apple", "Apple", "Banana"] {
            repo.create_item(create_input(name, Decimal::ONE), None)
                .await
                .unwrap();
        }

        assert_eq!(repo.count_by_name_prefix("A").await.unwrap(), 2);

        let page = repo.find_by_name_prefix("A", 0, 10).await.unwrap();
        let names: Vec<&str> = page.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Avocado"]);
    }

    #[tokio::test]
    async fn test_delete_item() {
        let repo = InMemoryCatalogRepository::new();
        let item = repo
            .create_item(create_input("Mug", Decimal::ONE), None)
            .await
            .unwrap();

        assert!(repo.delete_item(item.id).await.unwrap());
        assert!(!repo.delete_item(item.id).await.unwrap());
        assert!(repo.get_item(item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_event_log_pending_and_mark_published() {
        let repo = InMemoryCatalogRepository::new();
        let item = repo
            .create_item(create_input("Mug", Decimal::new(1000, 2)), None)
            .await
            .unwrap();

        let mutation = repo
            .update_item(item.id, update_from(&item, Decimal::new(1200, 2)), None)
            .await
            .unwrap();
        let event = mutation.price_event.unwrap();

        let pending = repo.pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);

        repo.mark_published(event.event_id).await.unwrap();
        assert!(repo.pending(10).await.unwrap().is_empty());

        let events = repo.recorded_events().await;
        assert_eq!(events[0].1, EventState::Published);
    }
}
