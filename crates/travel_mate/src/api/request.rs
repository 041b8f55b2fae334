use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// 创建行程
#[derive(Deserialize, ToSchema)]
pub struct CreateTripRequest {
    /// 归属账号 ID（账号体系由外部系统维护，缺省为 1）
    pub user_id: Option<i32>,
    pub destination: String,
    pub date_leaving: NaiveDate,
    pub date_returning: NaiveDate,
    /// 计划活动（换行分隔）
    pub activities: Option<String>,
    pub notes: Option<String>,
}

/// 更新行程（仅提交需要变更的字段）
#[derive(Deserialize, ToSchema)]
pub struct UpdateTripRequest {
    pub destination: Option<String>,
    pub date_leaving: Option<NaiveDate>,
    pub date_returning: Option<NaiveDate>,
    pub activities: Option<String>,
    pub notes: Option<String>,
}

/// 天气查询参数
#[derive(Deserialize, IntoParams)]
pub struct WeatherQuery {
    /// 目的地城市
    pub city: Option<String>,
    /// 行程开始日期（YYYY-MM-DD）
    pub start_date: Option<String>,
    /// 行程结束日期（YYYY-MM-DD）
    pub end_date: Option<String>,
}

/// 手动添加行李条目
#[derive(Deserialize, ToSchema)]
pub struct AddPackingItemRequest {
    pub name: String,
    /// 类别代码，非法值落入 MISC
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub is_essential: Option<bool>,
    pub notes: Option<String>,
    pub for_day: Option<NaiveDate>,
}

/// 更新行李条目（仅提交需要变更的字段）
#[derive(Deserialize, ToSchema)]
pub struct UpdatePackingItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub is_essential: Option<bool>,
    pub notes: Option<String>,
    /// 缺省表示不变更；显式传 null 可清除指定日期
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub for_day: Option<Option<NaiveDate>>,
}

/// 发送对话消息
#[derive(Deserialize, ToSchema)]
pub struct SendChatRequest {
    pub message: String,
    /// 发送者账号 ID，缺省为 1
    pub user_id: Option<i32>,
}

/// 更新配置项
#[derive(Deserialize, ToSchema)]
pub struct UpdateConfigRequest {
    /// 顶层配置键（bind_address / openrouter / weather）
    pub key_name: String,
    /// 新的 JSON 值
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}
