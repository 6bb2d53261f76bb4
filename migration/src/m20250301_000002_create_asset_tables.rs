use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_identity_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create assets table
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Assets::Name).string().not_null())
                    .col(ColumnDef::new(Assets::Model).string().null())
                    .col(ColumnDef::new(Assets::SerialNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Assets::Location).string().null())
                    .col(ColumnDef::new(Assets::Status).string().not_null())
                    .col(ColumnDef::new(Assets::Department).string().null())
                    .col(ColumnDef::new(Assets::Building).string().null())
                    .col(ColumnDef::new(Assets::Room).string().null())
                    .col(ColumnDef::new(Assets::CustodianId).string().null())
                    .col(ColumnDef::new(Assets::CustodianName).string().null())
                    .col(ColumnDef::new(Assets::PurchaseDate).string().null())
                    .col(ColumnDef::new(Assets::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Assets::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assets_custodian_id")
                            .from(Assets::Table, Assets::CustodianId)
                            .to(Users::Table, Users::Id)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assets_status")
                    .table(Assets::Table)
                    .col(Assets::Status)
                    .to_owned(),
            )
            .await?;

        // Create asset_activity table (append-only)
        manager
            .create_table(
                Table::create()
                    .table(AssetActivity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AssetActivity::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(AssetActivity::AssetId).string().not_null())
                    .col(ColumnDef::new(AssetActivity::ActorUserId).string().null())
                    .col(ColumnDef::new(AssetActivity::Action).string().not_null())
                    .col(ColumnDef::new(AssetActivity::BeforeState).text().null())
                    .col(ColumnDef::new(AssetActivity::AfterState).text().null())
                    .col(ColumnDef::new(AssetActivity::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_activity_asset_id")
                            .from(AssetActivity::Table, AssetActivity::AssetId)
                            .to(Assets::Table, Assets::Id)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_activity_actor_user_id")
                            .from(AssetActivity::Table, AssetActivity::ActorUserId)
                            .to(Users::Table, Users::Id)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_asset_activity_asset_id")
                    .table(AssetActivity::Table)
                    .col(AssetActivity::AssetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssetActivity::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    Name,
    Model,
    SerialNumber,
    Location,
    Status,
    Department,
    Building,
    Room,
    CustodianId,
    CustodianName,
    PurchaseDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AssetActivity {
    Table,
    Id,
    AssetId,
    ActorUserId,
    Action,
    BeforeState,
    AfterState,
    CreatedAt,
}
