use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 行李条目实体
///
/// `custom_added` 标记条目来源：用户手动添加的条目在 AI 重新生成时必须保留，
/// AI 生成的条目会被整批替换。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "packing_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub packing_list_id: i32,
    pub name: String,
    /// 类别代码（见 [`crate::category::PackingCategory`]）
    pub category: String,
    /// 数量，至少为 1
    pub quantity: i32,
    pub is_essential: bool,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    /// 指定使用日期（必须落在行程日期范围内）
    pub for_day: Option<Date>,
    /// 来源标记：true 表示用户手动添加
    pub custom_added: bool,
    /// 打包完成标记
    pub completed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::packing_list::Entity",
        from = "Column::PackingListId",
        to = "super::packing_list::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PackingList,
}

impl Related<super::packing_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackingList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
