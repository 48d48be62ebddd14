use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Services {
    Table,
    ProviderId,
    CategoryId,
    City,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    UserId,
    ProviderId,
    Status,
    RequestedAt,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    ServiceId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Provider listings
        manager
            .create_index(
                Index::create()
                    .name("idx_services_provider_id")
                    .table(Services::Table)
                    .col(Services::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_services_category_id")
                    .table(Services::Table)
                    .col(Services::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_services_city")
                    .table(Services::Table)
                    .col(Services::City)
                    .to_owned(),
            )
            .await?;

        // Catalog listing is newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_services_created_at")
                    .table(Services::Table)
                    .col(Services::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Customer booking list, newest request first
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_requested")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .col(Bookings::RequestedAt)
                    .to_owned(),
            )
            .await?;

        // Provider requests, optionally pending only
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_provider_status")
                    .table(Bookings::Table)
                    .col(Bookings::ProviderId)
                    .col(Bookings::Status)
                    .col(Bookings::RequestedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_service_created")
                    .table(Reviews::Table)
                    .col(Reviews::ServiceId)
                    .col(Reviews::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_reviews_service_created",
            "idx_bookings_provider_status",
            "idx_bookings_user_requested",
            "idx_services_created_at",
            "idx_services_city",
            "idx_services_category_id",
            "idx_services_provider_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}
