use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::dispatcher::EventDispatcher;
use crate::embedding::{content_text, EmbeddingProvider};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CatalogBrand, CatalogItem, CatalogType, CreateCatalogItem, PageRequest, PaginatedItems,
    UpdateCatalogItem,
};
use crate::ranking;
use crate::repository::CatalogRepository;

/// Service layer coordinating catalog mutations and search.
///
/// Mutations follow the outbox protocol: a price-changing update and its
/// integration event commit in one transaction (inside the repository), and
/// dispatch only runs after that commit. Search resolves against the
/// embedding space when the provider is enabled, falling back to name-prefix
/// matching otherwise, with one pagination contract across both paths.
#[derive(Clone)]
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
    embedding: Arc<dyn EmbeddingProvider>,
    dispatcher: Arc<EventDispatcher>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(
        repository: R,
        embedding: Arc<dyn EmbeddingProvider>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            embedding,
            dispatcher,
        }
    }

    /// Create a new catalog item. No event participation: a fresh row has no
    /// prior price to compare against.
    pub async fn create_item(&self, input: CreateCatalogItem) -> CatalogResult<CatalogItem> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let embedding = self
            .embed_content(&input.name, &input.description)
            .await?;

        self.repository.create_item(input, embedding).await
    }

    /// Get an item by id.
    pub async fn get_item(&self, id: i32) -> CatalogResult<CatalogItem> {
        ensure_valid_id(id)?;

        self.repository
            .get_item(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// List items ordered by name, paginated.
    pub async fn list_items(
        &self,
        page: PageRequest,
    ) -> CatalogResult<PaginatedItems<CatalogItem>> {
        ensure_valid_page(&page)?;

        let total_items = self.repository.count_items().await?;
        let items = self
            .repository
            .list_items(page.offset(), page.page_size)
            .await?;

        Ok(PaginatedItems::new(page, total_items, items))
    }

    /// Apply the full new state to an item.
    ///
    /// Order matters here: the embedding call happens before the transaction
    /// because the vector is part of the persisted row, and any failure up to
    /// the commit leaves the store untouched. Once committed, a failed
    /// dispatch only leaves the event pending; it never unwinds the mutation
    /// or fails the request.
    pub async fn update_item(
        &self,
        id: i32,
        update: UpdateCatalogItem,
    ) -> CatalogResult<CatalogItem> {
        ensure_valid_id(id)?;
        update
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        // NotFound before the (potentially slow) embedding call. The
        // repository re-checks existence under lock.
        if self.repository.get_item(id).await?.is_none() {
            return Err(CatalogError::NotFound(id));
        }

        let embedding = self
            .embed_content(&update.name, &update.description)
            .await?;

        let mutation = self.repository.update_item(id, update, embedding).await?;

        if let Some(event) = mutation.price_event.as_ref() {
            info!(
                item_id = id,
                event_id = %event.event_id,
                "Price changed; integration event recorded"
            );
            if let Err(e) = self.dispatcher.dispatch(event).await {
                warn!(
                    item_id = id,
                    event_id = %event.event_id,
                    error = %e,
                    "Dispatch failed; event left pending for the relay"
                );
            }
        }

        Ok(mutation.item)
    }

    /// Delete an item by id. No event is emitted for deletions.
    pub async fn delete_item(&self, id: i32) -> CatalogResult<()> {
        ensure_valid_id(id)?;

        let deleted = self.repository.delete_item(id).await?;
        if !deleted {
            return Err(CatalogError::NotFound(id));
        }

        Ok(())
    }

    /// Resolve a free-text query to a page of items ordered by relevance.
    ///
    /// With the provider disabled this is a name-prefix match and
    /// `total_items` is the match-set size. With it enabled, every item is
    /// ranked by cosine distance to the query vector and `total_items` is the
    /// full catalog count, since similarity has no membership test, only an
    /// ordering. The count and the page are separate reads; the window
    /// between them is an accepted approximation.
    pub async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> CatalogResult<PaginatedItems<CatalogItem>> {
        ensure_valid_page(&page)?;

        if !self.embedding.is_enabled() {
            let total_items = self.repository.count_by_name_prefix(query).await?;
            let items = self
                .repository
                .find_by_name_prefix(query, page.offset(), page.page_size)
                .await?;
            return Ok(PaginatedItems::new(page, total_items, items));
        }

        let query_vector = self
            .embedding
            .embed_text(query)
            .await
            .map_err(|e| CatalogError::EmbeddingUnavailable(e.to_string()))?;

        let total_items = self.repository.count_items().await?;
        let candidates = self.repository.items_for_ranking().await?;
        let ranked = ranking::rank(&query_vector, candidates);

        let items: Vec<CatalogItem> = ranked
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .map(|(item, distance)| {
                // Diagnostic only; the logged distance is the one that ordered
                // the page.
                debug!(item_id = item.id, distance, "Ranked search result");
                item
            })
            .collect();

        Ok(PaginatedItems::new(page, total_items, items))
    }

    /// Brand reference rows.
    pub async fn brands(&self) -> CatalogResult<Vec<CatalogBrand>> {
        self.repository.list_brands().await
    }

    /// Type reference rows.
    pub async fn types(&self) -> CatalogResult<Vec<CatalogType>> {
        self.repository.list_types().await
    }

    async fn embed_content(
        &self,
        name: &str,
        description: &str,
    ) -> CatalogResult<Option<Vec<f32>>> {
        if !self.embedding.is_enabled() {
            return Ok(None);
        }

        let vector = self
            .embedding
            .embed_text(&content_text(name, description))
            .await
            .map_err(|e| CatalogError::EmbeddingUnavailable(e.to_string()))?;

        Ok(Some(vector))
    }
}

fn ensure_valid_id(id: i32) -> CatalogResult<()> {
    if id <= 0 {
        return Err(CatalogError::Validation(format!(
            "Item id must be positive, got {id}"
        )));
    }
    Ok(())
}

fn ensure_valid_page(page: &PageRequest) -> CatalogResult<()> {
    if page.page_size == 0 {
        return Err(CatalogError::Validation(
            "Page size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
