use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 单条旅行贴士
///
/// 与行李条目不同，贴士没有来源标记，重新生成时会整表清空。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tip_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub travel_tips_id: i32,
    /// 类别代码（见 [`crate::category::TipCategory`]）
    pub category: String,
    /// 贴士正文
    #[sea_orm(column_type = "Text")]
    pub content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::travel_tips::Entity",
        from = "Column::TravelTipsId",
        to = "super::travel_tips::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TravelTips,
}

impl Related<super::travel_tips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TravelTips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
