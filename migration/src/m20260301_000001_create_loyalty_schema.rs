use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Slug,
    Name,
    PrimaryColor,
    SecondaryColor,
    PointsPerCurrencyUnit,
    RewardThreshold,
    WelcomeBonus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LoyaltyTiers {
    Table,
    Id,
    OrganizationId,
    Name,
    Threshold,
    Multiplier,
    Color,
    Benefits,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    OrganizationId,
    Name,
    Email,
    Phone,
    Points,
    Tier,
    TotalSpent,
    Visits,
    LastVisit,
    ReferralCode,
    ReferredBy,
    AuthUserId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PointTransactions {
    Table,
    Id,
    OrganizationId,
    CustomerId,
    Kind,
    Points,
    AmountCents,
    BalanceAfter,
    TierAfter,
    RewardId,
    RelatedCustomerId,
    Description,
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
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organizations::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Organizations::Slug)
                            .string_len(63)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string().not_null())
                    .col(ColumnDef::new(Organizations::PrimaryColor).string_len(7).null())
                    .col(ColumnDef::new(Organizations::SecondaryColor).string_len(7).null())
                    .col(
                        ColumnDef::new(Organizations::PointsPerCurrencyUnit)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .col(
                        ColumnDef::new(Organizations::RewardThreshold)
                            .big_integer()
                            .not_null()
                            .default(100),
                    )
                    .col(
                        ColumnDef::new(Organizations::WelcomeBonus)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Organizations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoyaltyTiers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LoyaltyTiers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LoyaltyTiers::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(LoyaltyTiers::Name).string().not_null())
                    .col(ColumnDef::new(LoyaltyTiers::Threshold).big_integer().not_null())
                    .col(
                        ColumnDef::new(LoyaltyTiers::Multiplier)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .col(ColumnDef::new(LoyaltyTiers::Color).string_len(7).null())
                    .col(
                        ColumnDef::new(LoyaltyTiers::Benefits)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(LoyaltyTiers::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loyalty_tiers_organization")
                            .from(LoyaltyTiers::Table, LoyaltyTiers::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // equal thresholds would make the resolver ambiguous
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_loyalty_tiers_org_threshold")
                    .table(LoyaltyTiers::Table)
                    .col(LoyaltyTiers::OrganizationId)
                    .col(LoyaltyTiers::Threshold)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_loyalty_tiers_org_name")
                    .table(LoyaltyTiers::Table)
                    .col(LoyaltyTiers::OrganizationId)
                    .col(LoyaltyTiers::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Email).string().null())
                    .col(ColumnDef::new(Customers::Phone).string_len(32).null())
                    .col(
                        ColumnDef::new(Customers::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Customers::Tier).string().not_null())
                    .col(
                        ColumnDef::new(Customers::TotalSpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::Visits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::LastVisit)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Customers::ReferralCode).string_len(16).not_null())
                    .col(ColumnDef::new(Customers::ReferredBy).uuid().null())
                    .col(ColumnDef::new(Customers::AuthUserId).uuid().null())
                    .col(
                        ColumnDef::new(Customers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_organization")
                            .from(Customers::Table, Customers::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_customers_org_referral_code")
                    .table(Customers::Table)
                    .col(Customers::OrganizationId)
                    .col(Customers::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("point_transaction_kind"))
                    .values(vec![
                        Alias::new("welcome_bonus"),
                        Alias::new("purchase"),
                        Alias::new("referral_bonus"),
                        Alias::new("redemption"),
                        Alias::new("adjustment"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PointTransactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PointTransactions::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(PointTransactions::CustomerId).uuid().not_null())
                    .col(
                        ColumnDef::new(PointTransactions::Kind)
                            .custom(Alias::new("point_transaction_kind"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::Points).big_integer().not_null())
                    .col(ColumnDef::new(PointTransactions::AmountCents).big_integer().null())
                    .col(
                        ColumnDef::new(PointTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::TierAfter).string().not_null())
                    .col(ColumnDef::new(PointTransactions::RewardId).uuid().null())
                    .col(ColumnDef::new(PointTransactions::RelatedCustomerId).uuid().null())
                    .col(ColumnDef::new(PointTransactions::Description).text().null())
                    .col(
                        ColumnDef::new(PointTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_point_transactions_customer")
                            .from(PointTransactions::Table, PointTransactions::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_transactions_customer_created")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::CustomerId)
                    .col(PointTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointTransactions::Table).to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("point_transaction_kind"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoyaltyTiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        Ok(())
    }
}
