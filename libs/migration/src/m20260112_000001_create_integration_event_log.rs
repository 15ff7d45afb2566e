use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create event_state enum
        manager
            .create_type(
                Type::create()
                    .as_enum(EventState::Enum)
                    .values([EventState::Pending, EventState::Published])
                    .to_owned(),
            )
            .await?;

        // Create integration_event_log table (the outbox)
        manager
            .create_table(
                Table::create()
                    .table(IntegrationEventLog::Table)
                    .if_not_exists()
                    .col(pk_uuid(IntegrationEventLog::EventId))
                    .col(integer(IntegrationEventLog::ItemId))
                    .col(
                        ColumnDef::new(IntegrationEventLog::NewPrice)
                            .decimal_len(18, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEventLog::OldPrice)
                            .decimal_len(18, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IntegrationEventLog::State)
                            .enumeration(
                                EventState::Enum,
                                [EventState::Pending, EventState::Published],
                            )
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        timestamp_with_time_zone(IntegrationEventLog::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(
                        IntegrationEventLog::PublishedAt,
                    ))
                    .to_owned(),
            )
            .await?;

        // The relay sweeps pending rows oldest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_integration_event_log_state_created_at")
                    .table(IntegrationEventLog::Table)
                    .col(IntegrationEventLog::State)
                    .col(IntegrationEventLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_integration_event_log_item_id")
                    .table(IntegrationEventLog::Table)
                    .col(IntegrationEventLog::ItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IntegrationEventLog::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EventState::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum IntegrationEventLog {
    Table,
    EventId,
    ItemId,
    NewPrice,
    OldPrice,
    State,
    CreatedAt,
    PublishedAt,
}

#[derive(DeriveIden)]
enum EventState {
    #[sea_orm(iden = "event_state")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "published")]
    Published,
}
