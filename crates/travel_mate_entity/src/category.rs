use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// 行李条目类别
///
/// 代码形式（`CLOTHING` 等）持久化到数据库，展示名用于前端与 AI 提示词。
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, EnumIter, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackingCategory {
    Clothing,
    Toiletries,
    Electronics,
    Documents,
    Misc,
}

impl PackingCategory {
    /// 数据库中存储的类别代码
    pub fn code(&self) -> &'static str {
        match self {
            PackingCategory::Clothing => "CLOTHING",
            PackingCategory::Toiletries => "TOILETRIES",
            PackingCategory::Electronics => "ELECTRONICS",
            PackingCategory::Documents => "DOCUMENTS",
            PackingCategory::Misc => "MISC",
        }
    }

    /// 展示名
    pub fn display_name(&self) -> &'static str {
        match self {
            PackingCategory::Clothing => "Clothing",
            PackingCategory::Toiletries => "Toiletries",
            PackingCategory::Electronics => "Electronics",
            PackingCategory::Documents => "Documents",
            PackingCategory::Misc => "Miscellaneous",
        }
    }
}

/// 旅行贴士类别
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, EnumIter, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipCategory {
    Cultural,
    LocalInfo,
    MustHave,
    General,
}

impl TipCategory {
    pub fn code(&self) -> &'static str {
        match self {
            TipCategory::Cultural => "CULTURAL",
            TipCategory::LocalInfo => "LOCAL_INFO",
            TipCategory::MustHave => "MUST_HAVE",
            TipCategory::General => "GENERAL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TipCategory::Cultural => "Cultural Advice",
            TipCategory::LocalInfo => "Local Information",
            TipCategory::MustHave => "Must Have Items",
            TipCategory::General => "General Tips",
        }
    }
}
