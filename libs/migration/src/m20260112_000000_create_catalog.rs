use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create catalog_brands reference table
        manager
            .create_table(
                Table::create()
                    .table(CatalogBrands::Table)
                    .if_not_exists()
                    .col(pk_auto(CatalogBrands::Id))
                    .col(string(CatalogBrands::Label))
                    .to_owned(),
            )
            .await?;

        // Create catalog_types reference table
        manager
            .create_table(
                Table::create()
                    .table(CatalogTypes::Table)
                    .if_not_exists()
                    .col(pk_auto(CatalogTypes::Id))
                    .col(string(CatalogTypes::Label))
                    .to_owned(),
            )
            .await?;

        // Create catalog_items table
        manager
            .create_table(
                Table::create()
                    .table(CatalogItems::Table)
                    .if_not_exists()
                    .col(pk_auto(CatalogItems::Id))
                    .col(string(CatalogItems::Name))
                    .col(text(CatalogItems::Description).default(""))
                    .col(
                        ColumnDef::new(CatalogItems::Price)
                            .decimal_len(18, 2)
                            .not_null(),
                    )
                    .col(string_null(CatalogItems::PictureFileName))
                    .col(integer(CatalogItems::CatalogBrandId))
                    .col(integer(CatalogItems::CatalogTypeId))
                    .col(integer(CatalogItems::AvailableStock).default(0))
                    .col(integer(CatalogItems::RestockThreshold).default(0))
                    .col(integer(CatalogItems::MaxStockThreshold).default(0))
                    .col(json_binary_null(CatalogItems::Embedding))
                    .col(
                        timestamp_with_time_zone(CatalogItems::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(CatalogItems::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_catalog_items_brand")
                            .from(CatalogItems::Table, CatalogItems::CatalogBrandId)
                            .to(CatalogBrands::Table, CatalogBrands::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_catalog_items_type")
                            .from(CatalogItems::Table, CatalogItems::CatalogTypeId)
                            .to(CatalogTypes::Table, CatalogTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_items_name")
                    .table(CatalogItems::Table)
                    .col(CatalogItems::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_items_brand_id")
                    .table(CatalogItems::Table)
                    .col(CatalogItems::CatalogBrandId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_items_type_id")
                    .table(CatalogItems::Table)
                    .col(CatalogItems::CatalogTypeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogItems::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CatalogTypes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CatalogBrands::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum CatalogBrands {
    Table,
    Id,
    Label,
}

#[derive(DeriveIden)]
enum CatalogTypes {
    Table,
    Id,
    Label,
}

#[derive(DeriveIden)]
enum CatalogItems {
    Table,
    Id,
    Name,
    Description,
    Price,
    PictureFileName,
    CatalogBrandId,
    CatalogTypeId,
    AvailableStock,
    RestockThreshold,
    MaxStockThreshold,
    Embedding,
    CreatedAt,
    UpdatedAt,
}
