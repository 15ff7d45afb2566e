use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the catalog_items table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub price: Decimal,
    pub picture_file_name: Option<String>,
    pub catalog_brand_id: i32,
    pub catalog_type_id: i32,
    pub available_stock: i32,
    pub restock_threshold: i32,
    pub max_stock_threshold: i32,
    pub embedding: Option<Json>, // JSONB field
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::catalog_brand::Entity",
        from = "Column::CatalogBrandId",
        to = "super::catalog_brand::Column::Id"
    )]
    Brand,
    #[sea_orm(
        belongs_to = "super::catalog_type::Entity",
        from = "Column::CatalogTypeId",
        to = "super::catalog_type::Column::Id"
    )]
    Type,
}

impl Related<super::catalog_brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::catalog_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Type.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// Conversion from Sea-ORM Model to domain CatalogItem
impl From<Model> for crate::models::CatalogItem {
    fn from(model: Model) -> Self {
        // Parse the embedding vector from JSON
        let embedding: Option<Vec<f32>> = model
            .embedding
            .and_then(|value| serde_json::from_value(value).ok());

        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            picture_file_name: model.picture_file_name,
            catalog_brand_id: model.catalog_brand_id,
            catalog_type_id: model.catalog_type_id,
            available_stock: model.available_stock,
            restock_threshold: model.restock_threshold,
            max_stock_threshold: model.max_stock_threshold,
            embedding,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
