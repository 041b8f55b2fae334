use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 行李清单实体，与行程一对一，首次访问时惰性创建
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "packing_list")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub trip_id: i32,
    /// 是否已经由 AI 生成过
    pub generated: bool,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Trip,
    #[sea_orm(has_many = "super::packing_item::Entity")]
    PackingItem,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::packing_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackingItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
