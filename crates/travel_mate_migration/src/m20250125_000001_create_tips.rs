use sea_orm_migration::prelude::*;

use super::m20250118_000001_create_trip::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建旅行贴士集合表（与行程一对一）
        manager
            .create_table(
                Table::create()
                    .table(TravelTips::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TravelTips::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TravelTips::TripId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TravelTips::Generated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TravelTips::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travel_tips_trip")
                            .from(TravelTips::Table, TravelTips::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建贴士条目表
        manager
            .create_table(
                Table::create()
                    .table(TipItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TipItem::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TipItem::TravelTipsId).integer().not_null())
                    .col(
                        ColumnDef::new(TipItem::Category)
                            .string()
                            .not_null()
                            .default("GENERAL"),
                    )
                    .col(ColumnDef::new(TipItem::Content).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tip_item_travel_tips")
                            .from(TipItem::Table, TipItem::TravelTipsId)
                            .to(TravelTips::Table, TravelTips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tip_item_travel_tips")
                    .table(TipItem::Table)
                    .col(TipItem::TravelTipsId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TipItem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TravelTips::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TravelTips {
    Table,
    Id,
    TripId,
    Generated,
    LastUpdated,
}

#[derive(DeriveIden)]
pub enum TipItem {
    Table,
    Id,
    TravelTipsId,
    Category,
    Content,
}
