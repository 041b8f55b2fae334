use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建行程表
        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trip::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trip::UserId).integer().not_null())
                    .col(ColumnDef::new(Trip::Destination).string().not_null())
                    .col(ColumnDef::new(Trip::DateLeaving).date().not_null())
                    .col(ColumnDef::new(Trip::DateReturning).date().not_null())
                    .col(ColumnDef::new(Trip::Activities).text().not_null().default(""))
                    .col(ColumnDef::new(Trip::Notes).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Trip::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 按账号查询行程列表
        manager
            .create_index(
                Index::create()
                    .name("idx_trip_user_id")
                    .table(Trip::Table)
                    .col(Trip::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Trip::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Trip {
    Table,
    Id,
    UserId,
    Destination,
    DateLeaving,
    DateReturning,
    Activities,
    Notes,
    CreatedAt,
}
