use sea_orm_migration::prelude::*;

use super::m20250118_000001_create_trip::Trip;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建行李清单表（与行程一对一）
        manager
            .create_table(
                Table::create()
                    .table(PackingList::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackingList::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PackingList::TripId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PackingList::Generated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PackingList::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packing_list_trip")
                            .from(PackingList::Table, PackingList::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建行李条目表
        manager
            .create_table(
                Table::create()
                    .table(PackingItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackingItem::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PackingItem::PackingListId).integer().not_null())
                    .col(ColumnDef::new(PackingItem::Name).string().not_null())
                    .col(ColumnDef::new(PackingItem::Category).string().not_null())
                    .col(ColumnDef::new(PackingItem::Quantity).integer().not_null().default(1))
                    .col(
                        ColumnDef::new(PackingItem::IsEssential)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PackingItem::Notes).text().not_null().default(""))
                    .col(ColumnDef::new(PackingItem::ForDay).date().null())
                    .col(
                        ColumnDef::new(PackingItem::CustomAdded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PackingItem::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packing_item_packing_list")
                            .from(PackingItem::Table, PackingItem::PackingListId)
                            .to(PackingList::Table, PackingList::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 重新生成时按清单 + 来源删除，建立复合索引
        manager
            .create_index(
                Index::create()
                    .name("idx_packing_item_list_custom")
                    .table(PackingItem::Table)
                    .col(PackingItem::PackingListId)
                    .col(PackingItem::CustomAdded)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackingItem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PackingList::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PackingList {
    Table,
    Id,
    TripId,
    Generated,
    LastUpdated,
}

#[derive(DeriveIden)]
pub enum PackingItem {
    Table,
    Id,
    PackingListId,
    Name,
    Category,
    Quantity,
    IsEssential,
    Notes,
    ForDay,
    CustomAdded,
    Completed,
}
