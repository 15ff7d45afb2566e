use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Catalog item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier
    pub id: i32,
    /// Display name
    pub name: String,
    /// Item description; feeds the embedding together with the name
    pub description: String,
    /// Unit price; changing it emits an integration event
    pub price: Decimal,
    /// Picture file served by the web layer
    pub picture_file_name: Option<String>,
    /// Brand reference
    pub catalog_brand_id: i32,
    /// Type reference
    pub catalog_type_id: i32,
    /// Units currently in stock
    pub available_stock: i32,
    /// Stock level that triggers a reorder
    pub restock_threshold: i32,
    /// Maximum units a reorder can bring the stock to
    pub max_stock_threshold: i32,
    /// Embedding of the item content; recomputed on every content change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Brand reference table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBrand {
    pub id: i32,
    pub label: String,
}

/// Type reference table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogType {
    pub id: i32,
    pub label: String,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

fn check_stock_thresholds(restock: i32, max: i32) -> Result<(), ValidationError> {
    if restock > max {
        return Err(ValidationError::new("restock_above_max"));
    }
    if restock < 0 || max < 0 {
        return Err(ValidationError::new("negative_stock_threshold"));
    }
    Ok(())
}

fn validate_create_thresholds(input: &CreateCatalogItem) -> Result<(), ValidationError> {
    check_stock_thresholds(input.restock_threshold, input.max_stock_threshold)
}

fn validate_update_thresholds(input: &UpdateCatalogItem) -> Result<(), ValidationError> {
    check_stock_thresholds(input.restock_threshold, input.max_stock_threshold)
}

/// DTO for creating a new catalog item
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_create_thresholds"))]
pub struct CreateCatalogItem {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub picture_file_name: Option<String>,
    pub catalog_brand_id: i32,
    pub catalog_type_id: i32,
    #[serde(default)]
    pub available_stock: i32,
    #[serde(default)]
    pub restock_threshold: i32,
    #[serde(default)]
    pub max_stock_threshold: i32,
}

/// DTO carrying the full new state of an item for an update.
///
/// Updates are whole-row: the price diff that drives event emission compares
/// the persisted row against `price` here, never any in-memory intermediate.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_update_thresholds"))]
pub struct UpdateCatalogItem {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub picture_file_name: Option<String>,
    pub catalog_brand_id: i32,
    pub catalog_type_id: i32,
    #[serde(default)]
    pub available_stock: i32,
    #[serde(default)]
    pub restock_threshold: i32,
    #[serde(default)]
    pub max_stock_threshold: i32,
}

/// Pagination request shared by every listing/search operation.
///
/// `page_index` is zero-based. Bounding `page_size` to a maximum is the
/// caller-facing layer's job; here it only has to be positive.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page_index: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page_size() -> u64 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    pub fn new(page_index: u64, page_size: u64) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        self.page_index * self.page_size
    }
}

/// One page of results plus the paging envelope.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedItems<T> {
    pub page_index: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub items: Vec<T>,
}

impl<T> PaginatedItems<T> {
    pub fn new(page: PageRequest, total_items: u64, items: Vec<T>) -> Self {
        Self {
            page_index: page.page_index,
            page_size: page.page_size,
            total_items,
            items,
        }
    }
}
