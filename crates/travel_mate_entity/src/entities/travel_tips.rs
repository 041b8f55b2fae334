use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 旅行贴士集合实体，与行程一对一
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "travel_tips")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub trip_id: i32,
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
    #[sea_orm(has_many = "super::tip_item::Entity")]
    TipItem,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::tip_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TipItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
