use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 行程实体，所有生成内容的根
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trip")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// 行程归属的账号 ID（账号体系由外部系统维护）
    pub user_id: i32,
    /// 目的地（自由文本，如 "Paris"）
    pub destination: String,
    /// 出发日期
    pub date_leaving: Date,
    /// 返程日期（不早于出发日期）
    pub date_returning: Date,
    /// 计划活动（换行分隔的自由文本）
    #[sea_orm(column_type = "Text")]
    pub activities: String,
    /// 备注
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::packing_list::Entity")]
    PackingList,
    #[sea_orm(has_one = "super::travel_tips::Entity")]
    TravelTips,
    #[sea_orm(has_many = "super::chat_message::Entity")]
    ChatMessage,
}

impl Related<super::packing_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackingList.def()
    }
}

impl Related<super::travel_tips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TravelTips.def()
    }
}

impl Related<super::chat_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatMessage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 行程天数（首尾两天均计入）
    pub fn duration_days(&self) -> i64 {
        (self.date_returning - self.date_leaving).num_days() + 1
    }
}
