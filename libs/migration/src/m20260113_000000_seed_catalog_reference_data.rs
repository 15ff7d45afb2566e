use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const BRANDS: [&str; 4] = ["Daybird", "Gravitate", "Solstix", "Zephyr"];
const TYPES: [&str; 4] = ["Footwear", "Climbing", "Cycling", "Trail"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert_brands = Query::insert()
            .into_table(CatalogBrands::Table)
            .columns([CatalogBrands::Label])
            .to_owned();
        for brand in BRANDS {
            insert_brands.values_panic([brand.into()]);
        }
        manager.exec_stmt(insert_brands).await?;

        let mut insert_types = Query::insert()
            .into_table(CatalogTypes::Table)
            .columns([CatalogTypes::Label])
            .to_owned();
        for label in TYPES {
            insert_types.values_panic([label.into()]);
        }
        manager.exec_stmt(insert_types).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(CatalogBrands::Table)
                    .and_where(Expr::col(CatalogBrands::Label).is_in(BRANDS))
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(CatalogTypes::Table)
                    .and_where(Expr::col(CatalogTypes::Label).is_in(TYPES))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum CatalogBrands {
    Table,
    Label,
}

#[derive(DeriveIden)]
enum CatalogTypes {
    Table,
    Label,
}
