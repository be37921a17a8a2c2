use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Rewards {
    Table,
    Id,
    OrganizationId,
    Name,
    Description,
    PointsRequired,
    RequiredTier,
    StockQuantity,
    ValidFrom,
    ValidUntil,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CustomerNotifications {
    Table,
    Id,
    OrganizationId,
    CustomerId,
    Category,
    Title,
    Message,
    Metadata,
    IsRead,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rewards::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rewards::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Rewards::Name).string().not_null())
                    .col(ColumnDef::new(Rewards::Description).text().null())
                    .col(ColumnDef::new(Rewards::PointsRequired).big_integer().not_null())
                    .col(ColumnDef::new(Rewards::RequiredTier).string().null())
                    .col(ColumnDef::new(Rewards::StockQuantity).integer().null())
                    .col(ColumnDef::new(Rewards::ValidFrom).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Rewards::ValidUntil).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Rewards::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Rewards::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rewards_org_active")
                    .table(Rewards::Table)
                    .col(Rewards::OrganizationId)
                    .col(Rewards::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerNotifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerNotifications::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomerNotifications::CustomerId).uuid().not_null())
                    .col(
                        ColumnDef::new(CustomerNotifications::Category)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomerNotifications::Title).string().not_null())
                    .col(ColumnDef::new(CustomerNotifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(CustomerNotifications::Metadata)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(CustomerNotifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CustomerNotifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_customer_notifications_customer_unread")
                    .table(CustomerNotifications::Table)
                    .col(CustomerNotifications::CustomerId)
                    .col(CustomerNotifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomerNotifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rewards::Table).to_owned())
            .await?;
        Ok(())
    }
}
